pub mod alignment;
pub mod astronomy;
pub mod context;
pub mod planner;
pub mod weather;

pub use alignment::{align, resolve_by_title, AlignmentResult, Conflict, DeletedTask};
pub use astronomy::{AstronomyPicture, AstronomyService};
pub use planner::{generate_plan, PlannerError};
pub use weather::{WeatherReport, WeatherService};
