mod params;
mod schema;

pub use params::{ParamDef, Params};
pub use schema::{BrowserConfig, Config, Mode, PageElements, ProbeConfig, TargetUrl, Viewport};
