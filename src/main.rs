mod app;
mod cli;
mod core;
mod logging;
mod widgets;

use app::App;
use cli::parse_args;
use log::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = parse_args();
    logging::init_logging(settings.log_file.as_deref())?;
    settings.ranking.validate()?;

    info!(
        "starting: interval {:?}, top {}, threshold {}%",
        settings.interval, settings.ranking.top_k, settings.ranking.threshold
    );

    let mut terminal = match ratatui::try_init() {
        Ok(terminal) => terminal,
        Err(err) => {
            error!("no terminal to draw on: {}", err);
            return Ok(());
        }
    };

    let app_result = App::new(&settings).and_then(|mut app| app.run(&mut terminal));

    ratatui::restore();

    app_result?;

    Ok(())
}
