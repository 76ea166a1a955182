//! Bounded connection pool for the SQLite backend
//!
//! Connections are opened lazily up to a hard maximum and handed out as
//! [`PooledConnection`] guards that return to the pool on drop instead of
//! closing. Exhaustion fails fast with `NoFreeConnection`; a closed pool
//! never reopens. One pool-wide mutex keeps the idle list and the
//! open-connection count consistent.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;

use crate::{Error, Result};

#[derive(Debug, Default)]
struct PoolState {
    idle: Vec<Connection>,
    open_count: usize,
    closed: bool,
}

/// Thread-safe pool of physical SQLite connections with a fixed upper bound.
pub struct ConnectionPool {
    path: PathBuf,
    max_size: usize,
    state: Mutex<PoolState>,
}

impl ConnectionPool {
    /// Open a pool against a database file, pre-opening `initial`
    /// connections.
    pub fn new(path: &Path, initial: usize, max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidParameter(
                "max_pool_size must be greater than zero".to_string(),
            ));
        }
        if initial > max_size {
            return Err(Error::InvalidParameter(format!(
                "initial_pool_size {} exceeds max_pool_size {}",
                initial, max_size
            )));
        }

        let mut idle = Vec::with_capacity(initial);
        for _ in 0..initial {
            idle.push(Connection::open(path)?);
        }
        tracing::debug!(
            "opened connection pool on {} ({} initial, {} max)",
            path.display(),
            initial,
            max_size
        );

        Ok(Self {
            path: path.to_path_buf(),
            max_size,
            state: Mutex::new(PoolState { open_count: initial, idle, closed: false }),
        })
    }

    /// Borrow a connection, opening a new one while the pool is under its
    /// maximum. Fails fast with `NoFreeConnection` when exhausted or closed.
    pub fn acquire(&self) -> Result<PooledConnection<'_>> {
        let mut state = self.lock();
        if state.closed {
            return Err(Error::NoFreeConnection("pool is closed".to_string()));
        }

        if let Some(conn) = state.idle.pop() {
            return Ok(PooledConnection { pool: self, conn: Some(conn) });
        }

        if state.open_count < self.max_size {
            // Opening while holding the lock keeps the count honest.
            let conn = Connection::open(&self.path)?;
            state.open_count += 1;
            return Ok(PooledConnection { pool: self, conn: Some(conn) });
        }

        Err(Error::NoFreeConnection(format!(
            "all {} connections are in use",
            self.max_size
        )))
    }

    fn release(&self, conn: Connection) {
        let mut state = self.lock();
        if state.closed || state.idle.len() >= self.max_size {
            // Dropping the connection closes it physically.
            state.open_count = state.open_count.saturating_sub(1);
            drop(conn);
        } else {
            state.idle.push(conn);
        }
    }

    /// Physically close every idle connection and refuse further acquires.
    ///
    /// Connections still checked out are closed as their guards drop.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.open_count = state.open_count.saturating_sub(state.idle.len());
        state.idle.clear();
        tracing::debug!("closed connection pool on {}", self.path.display());
    }

    /// Idle connections currently waiting in the pool
    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    /// Connections currently open, idle or checked out
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// A borrowed connection that returns to its pool on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken before drop")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken before drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
