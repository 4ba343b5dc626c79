//! Convenient re-exports of commonly used types.
//!
//! ```
//! use chunked_ecs::prelude::*;
//! ```

pub use crate::command::CommandBuffer;
pub use crate::component::{Bundle, Component, ComponentTypeId};
pub use crate::config::EcsConfig;
pub use crate::entity::EntityId;
pub use crate::error::{EcsError, Result};
pub use crate::executor::SystemScheduler;
pub use crate::query::QueryBuilder;
pub use crate::schedule::Schedule;
pub use crate::system::{Phase, System, SystemAccess};
pub use crate::world::{ComponentRef, ComponentRefMut, World};
