mod health;
mod resolve;
mod share;

pub use health::HealthService;
pub use resolve::ResolveService;
pub use share::ShareService;
