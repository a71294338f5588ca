//! `raya-box inspect`: Derive a blueprint for a builtin and print it.

use raya_box::blueprint::EntrySummary;
use raya_box::{derive_blueprint, AdaptOptions, Realm};

use super::{builtin, Context};
use crate::output::StyledOutput;

pub fn execute(ctx: &Context, name: &str, json: bool) -> anyhow::Result<()> {
    let realm = Realm::new();
    let ctor = builtin(&realm, name)?;
    let summary = derive_blueprint(&realm, &ctor, AdaptOptions::default())?.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut out = StyledOutput::new(ctx.choice);
    out.heading(&summary.name);
    out.field("prototype", &summary.proto_proto);
    out.field("constructor", &summary.constructor_proto);
    out.field("unwrapThis", &summary.unwrap_this.to_string());
    if let Some(wraps) = &summary.wraps {
        out.field("wraps", wraps);
    }

    out.newline();
    out.heading(&format!("proto ({})", summary.proto.len()));
    print_entries(&mut out, &summary.proto);

    out.newline();
    out.heading(&format!("static ({})", summary.statics.len()));
    print_entries(&mut out, &summary.statics);
    Ok(())
}

fn print_entries(out: &mut StyledOutput, entries: &[EntrySummary]) {
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    for entry in entries {
        out.plain(&format!("  {:<width$}  ", entry.key, width = width));
        out.info(&format!("{:<8}", entry.descriptor.kind));
        out.dim(&flags(entry));
        out.newline();
    }
}

/// `wec` flags, `-` where unset or false
fn flags(entry: &EntrySummary) -> String {
    let d = &entry.descriptor;
    [(d.writable, 'w'), (d.enumerable, 'e'), (d.configurable, 'c')]
        .iter()
        .map(|(flag, c)| if *flag == Some(true) { *c } else { '-' })
        .collect()
}
