//! Attachment sockets and nearest-socket resolution
//!
//! Every instantiated module exposes named attachment transforms (sockets)
//! for children to parent onto. The graph answers nearest-socket queries:
//! world-space Euclidean argmin over the eligible candidates, with a stable
//! first-wins tie break.

use crate::error::{Error, Result};
use glam::Vec3;

/// Index of a socket inside the [`SocketGraph`]
pub type SocketId = usize;

/// Index of the module instance owning a socket
pub type ModuleId = usize;

/// A named attachment transform exposed by a module
#[derive(Debug, Clone)]
pub struct Socket {
    pub name: String,
    /// Owning module instance; sockets live exactly as long as their owner
    pub module: ModuleId,
    /// World-space position of the attachment transform
    pub position: Vec3,
}

/// Append-only table of all sockets registered during a build
#[derive(Debug, Clone, Default)]
pub struct SocketGraph {
    sockets: Vec<Socket>,
}

impl SocketGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket, returning its id
    pub fn register(&mut self, socket: Socket) -> SocketId {
        self.sockets.push(socket);
        self.sockets.len() - 1
    }

    pub fn get(&self, id: SocketId) -> &Socket {
        &self.sockets[id]
    }

    pub fn all(&self) -> &[Socket] {
        &self.sockets
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Nearest socket to `target`, skipping sockets owned by `excluding`
    ///
    /// Stable: among equal minimal distances the first candidate in
    /// registration order wins. Errors with [`Error::NoAttachmentPoint`]
    /// when no eligible candidate remains; `guide_name` only labels that
    /// error.
    pub fn nearest(
        &self,
        target: Vec3,
        excluding: Option<ModuleId>,
        guide_name: &str,
    ) -> Result<SocketId> {
        let mut best: Option<(SocketId, f32)> = None;
        for (id, socket) in self.sockets.iter().enumerate() {
            if excluding == Some(socket.module) {
                continue;
            }
            let dist = target.distance_squared(socket.position);
            // Strict less-than keeps the first of equal candidates
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((id, dist));
            }
        }

        best.map(|(id, _)| id).ok_or_else(|| Error::NoAttachmentPoint {
            guide: guide_name.to_string(),
        })
    }
}
