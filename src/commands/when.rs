use anyhow::Result;
use history_replay::history::EventTime;
use history_replay::plan;
use std::path::Path;

pub fn execute(plan_path: &Path, day: u32, hour: u8, minute: u8) -> Result<()> {
    if hour > 23 || minute > 59 {
        anyhow::bail!("{:02}:{:02} is not a valid time of day", hour, minute);
    }

    let plan = plan::load(plan_path)?;
    let resolved = plan.anchor.resolve(EventTime::new(day, hour, minute))?;
    println!("{}", resolved);
    Ok(())
}
