//! Parser for comma-separated player scripts such as `down*12,spray,left*3`.

use anyhow::{bail, Context, Result};
use iceman_core::{Direction, PlayerAction};

const REPEAT_DELIMITER: char = '*';

/// Parses a script into one action per tick.
pub(crate) fn parse_script(script: &str) -> Result<Vec<PlayerAction>> {
    let mut actions = Vec::new();
    for token in script.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (name, count) = match token.split_once(REPEAT_DELIMITER) {
            Some((name, count)) => {
                let count = count
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("invalid repeat count in script token '{token}'"))?;
                (name.trim(), count)
            }
            None => (token, 1),
        };

        let action = parse_action(name)?;
        actions.extend(std::iter::repeat(action).take(count));
    }
    Ok(actions)
}

fn parse_action(name: &str) -> Result<PlayerAction> {
    let action = match name.to_ascii_lowercase().as_str() {
        "none" | "wait" => PlayerAction::None,
        "up" => PlayerAction::Move(Direction::Up),
        "down" => PlayerAction::Move(Direction::Down),
        "left" => PlayerAction::Move(Direction::Left),
        "right" => PlayerAction::Move(Direction::Right),
        "spray" => PlayerAction::Spray,
        "sonar" => PlayerAction::Sonar,
        "gold" | "drop" => PlayerAction::DropGold,
        "giveup" => PlayerAction::GiveUp,
        other => bail!("unknown script action '{other}'"),
    };
    Ok(action)
}
