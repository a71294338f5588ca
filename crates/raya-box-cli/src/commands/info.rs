//! `raya-box info`: Display version, builtins and configuration.

use raya_box::{BoxConfig, Realm, CONFIG_FILE_NAME};

use super::Context;
use crate::output::StyledOutput;

pub fn execute(ctx: &Context) -> anyhow::Result<()> {
    let mut out = StyledOutput::new(ctx.choice);
    out.heading(&format!("raya-box v{}", env!("CARGO_PKG_VERSION")));
    out.newline();

    out.field("Platform", &format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH));
    out.field("Builtins", &Realm::new().global_names().join(", "));
    match &ctx.config_path {
        Some(path) => out.field("Config", &path.display().to_string()),
        None => out.field("Config", &format!("(defaults, no {})", CONFIG_FILE_NAME)),
    }

    out.newline();
    out.heading("Default configuration:");
    out.plain(&BoxConfig::default().to_toml()?);

    if ctx.config_path.is_some() {
        out.newline();
        out.heading("Active configuration:");
        out.plain(&ctx.config.to_toml()?);
    }
    Ok(())
}
