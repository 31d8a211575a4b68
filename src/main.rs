use anyhow::{Context, Result};
use worldtime::App;

fn main() -> Result<()> {
    App::new()
        .context("create app")?
        .start()
        .context("start app")
}
