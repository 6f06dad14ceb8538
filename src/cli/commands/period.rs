use duo_domain::{ProjectionPolicy, ScheduleAnchor};

use crate::cli::core::{parse_period, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "period",
            "Show or change the month being viewed",
            "period [YYYY-MM|next|prev|now]",
            cmd_period,
        ),
        CommandEntry::new(
            "policy",
            "Show or change how installments are placed on the calendar",
            "policy [a|b] [offset on|off]",
            cmd_policy,
        ),
    ]
}

fn cmd_period(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(value) = args.first() {
        context.period = parse_period(value, context.period)?;
        tracing::debug!(period = %context.period, "period changed");
    }
    io::print_info(format!(
        "Period: {} ({})",
        context.period,
        context.period.label(context.config.month_locale).to_uppercase()
    ));
    Ok(())
}

fn cmd_policy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut policy = context.policy;
    let mut remaining = args.iter().map(|arg| arg.to_ascii_lowercase());
    while let Some(arg) = remaining.next() {
        match arg.as_str() {
            "a" | "purchase" | "purchase-month" => policy.anchor = ScheduleAnchor::PurchaseMonth,
            "b" | "following" | "following-month" => {
                policy.anchor = ScheduleAnchor::FollowingMonth
            }
            "default" => policy = context.config.projection,
            "offset" => {
                let switch = remaining.next().ok_or_else(|| {
                    CommandError::InvalidArguments("usage: policy offset on|off".into())
                })?;
                policy = policy.with_paid_offset(parse_switch(&switch)?);
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown policy setting `{}` (use a, b, default or offset on|off)",
                    other
                )))
            }
        }
    }
    context.policy = policy;
    describe_policy(policy);
    Ok(())
}

fn describe_policy(policy: ProjectionPolicy) {
    io::print_info(format!("Policy: {}", policy));
    let detail = match policy.anchor {
        ScheduleAnchor::PurchaseMonth => "installment 1 is billed in the purchase month",
        ScheduleAnchor::FollowingMonth => {
            "installment 1 is billed the month after purchase; the purchase month shows a launch row"
        }
    };
    io::print_hint(detail);
    if policy.apply_paid_offset {
        io::print_hint("schedules start `installments paid` months earlier");
    }
}

pub(crate) fn parse_switch(value: &str) -> Result<bool, CommandError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "expected on or off, got `{}`",
            other
        ))),
    }
}
