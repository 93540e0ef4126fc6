use anyhow::Result;
use maratron::models::SignupStep;

use super::AppContext;

pub fn show_status(ctx: &AppContext) -> Result<()> {
    let flow = ctx.store.load_signup_flow(ctx.user_id())?;

    println!("Signup Progress");
    println!("────────────────────────────────");
    for step in SignupStep::ALL {
        let marker = if flow.is_completed(step) {
            "✓"
        } else if flow.is_unlocked(step) {
            "→"
        } else {
            "·"
        };
        println!("  {} {}", marker, step);
    }

    if flow.is_finished() {
        println!();
        println!("Signup complete");
    }
    Ok(())
}

pub fn complete_step(ctx: &AppContext, step: &str) -> Result<()> {
    let step: SignupStep = step.parse()?;
    let mut flow = ctx.store.load_signup_flow(ctx.user_id())?;

    let next = flow.complete(step)?;
    ctx.store.save_signup_flow(ctx.user_id(), &flow)?;

    println!("✓ Completed {}", step);
    match next {
        Some(next) => println!("Next step: {}", next),
        None => println!("Signup complete"),
    }
    Ok(())
}
