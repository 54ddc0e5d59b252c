pub mod app;
pub mod error;
pub mod events;
pub mod layout;
pub mod render;
pub mod widgets;

pub use app::App;
pub use error::TuiError;
pub use events::run_event_loop;
pub use layout::Layout;
pub use render::render;

use crate::config::Config;
use crate::entries::EntriesContainer;

/// Build the app and run it until the user quits
pub fn run(config: Config, entries: EntriesContainer) -> Result<(), TuiError> {
    let app = App::new(config, entries)?;
    run_event_loop(app)
}
