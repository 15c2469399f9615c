use std::sync::Arc;

use crate::config::DeskConfig;
use crate::storage::Persistence;
use crate::vfs::VirtualFileSystem;
use crate::wm::{CommandQueue, WindowManager};

/// One desktop session: a filesystem and a window manager side by side.
/// The two never reach into each other; callers compose them.
pub struct Session {
    pub vfs: VirtualFileSystem,
    pub wm: WindowManager<CommandQueue>,
}

impl Session {
    pub fn new(store: Arc<dyn Persistence>, config: &DeskConfig) -> Session {
        Session {
            vfs: VirtualFileSystem::new(store, config.directory_overwrite),
            wm: WindowManager::new(CommandQueue::default(), config.viewport),
        }
    }
}
