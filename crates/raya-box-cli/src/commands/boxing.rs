//! `raya-box box`: Box a literal with a builtin's derived blueprint.

use anyhow::anyhow;
use raya_box::{derive_blueprint, AdaptOptions, BoxFactory, MemoryReporter, Realm, Report, Value};
use std::sync::Arc;

use super::{builtin, parse_literal, Context};
use crate::output::StyledOutput;

/// Arguments of `raya-box box`
pub struct BoxArgs {
    pub builtin: String,
    pub value: String,
    pub bare: bool,
    pub call: Vec<String>,
    pub quiet: bool,
}

pub fn execute(ctx: &Context, args: BoxArgs) -> anyhow::Result<()> {
    let realm = Realm::new();
    let ctor = builtin(&realm, &args.builtin)?;
    let blueprint = derive_blueprint(&realm, &ctor, AdaptOptions::default())?;

    let style = ctx.config.report.style()?;
    let reporter = Arc::new(MemoryReporter::new());
    let factory = BoxFactory::new(&realm)
        .with_reporter(reporter.clone())
        .with_style(style)
        .auto_box_literals(ctx.config.factory.auto_box_literals);
    let boxed = factory.create(&blueprint)?;

    let mut out = StyledOutput::new(ctx.choice);
    let failures = reporter.take();
    if args.quiet {
        if !failures.is_empty() {
            out.warning(&format!("{} installation failure(s)", failures.len()));
            out.newline();
        }
    } else {
        for message in &failures {
            out.report(message, style.color);
        }
    }

    let input = parse_literal(&args.value);
    let value = if args.bare {
        boxed.call(input)?
    } else {
        boxed.construct(input)?
    };

    let value_of = realm.invoke(&value, "valueOf", &[])?;
    let string = realm.call(
        &Value::Object(builtin(&realm, "String")?),
        &Value::Undefined,
        std::slice::from_ref(&value),
    )?;

    out.field("type", boxed.name());
    out.field("construct", if args.bare { "call" } else { "new" });
    out.field("valueOf()", &format!("{:?}", value_of));
    out.field("String()", &format!("{:?}", string));
    out.dim(&format!("{:<12}", "instance:"));
    if boxed.is_instance(&value) {
        out.success("true");
    } else {
        out.warning("false");
    }
    out.newline();

    if let Some((method, rest)) = args.call.split_first() {
        let call_args: Vec<Value> = rest.iter().map(String::as_str).map(parse_literal).collect();
        let result = realm
            .invoke(&value, method.as_str(), &call_args)
            .map_err(|err| anyhow!("{}", Report::from_error(&err, method)))?;
        let rendered: Vec<String> = call_args.iter().map(|arg| format!("{:?}", arg)).collect();
        out.field(&format!("{}({})", method, rendered.join(", ")), &format!("{:?}", result));
    }
    Ok(())
}
