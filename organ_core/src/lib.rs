//! # Organ Core
//!
//! Simulation of a central cavity, its sphincter, two ducts and two glands as
//! a network of deformable fluid containers. Each organ stretches and
//! inflates within integrity limits, fluid moves between them by intake,
//! routing, backflow and leakage, and sustained strain drives the cavity
//! through descent and prolapse to full eversion.
//!
//! ## Core Components
//!
//! - **cavity**: The orchestrator that owns every other organ and runs [`Cavity::tick`]
//! - **wall**: Elastic/plastic wall with integrity and fatigue
//! - **sphincter**: The outlet gate and its dilation
//! - **duct**: Paired slender conduits with forwarding and backflow
//! - **gland**: Paired secretory bodies with follicles and their own prolapse
//! - **events**: Typed organ events and the observer bus
//! - **config** / **constants**: Runtime anatomy and fixed tuning numbers
//!
//! The host drives the simulation by calling `tick` once per interval and the
//! mutators in between. Nothing here blocks, spawns or persists.

pub mod anatomy;
pub mod cavity;
pub mod config;
pub mod constants;
pub mod duct;
pub mod error;
pub mod events;
pub mod gland;
pub mod outcome;
pub mod sphincter;
pub mod wall;

pub use anatomy::*;
pub use cavity::*;
pub use config::*;
pub use duct::*;
pub use error::*;
pub use events::*;
pub use gland::*;
pub use outcome::*;
pub use sphincter::*;
pub use wall::*;
