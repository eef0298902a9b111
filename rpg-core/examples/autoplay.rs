//! Plays a short seeded game from the terminal, printing every event.
//!
//! Run with: `cargo run -p rpg-core --example autoplay`

use rpg_core::combat::ActionChoice;
use rpg_core::exploration::Discovery;
use rpg_core::testing::ScriptedInput;
use rpg_core::{logging, GameSession, PlayerClass, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing("warn");

    let config = SessionConfig::new("Thorin", PlayerClass::Warrior)
        .with_seed(2024)
        .with_starting_location("Western Forest");
    let mut session = GameSession::new(config)?;
    session.accept_quest("First Steps")?;

    println!("=== {} the {} ===\n", session.player().name(), session.player().class);

    for turn in 1..=8 {
        if !session.player().is_alive() {
            println!("Defeated. Reviving in town.");
            session.revive();
            break;
        }
        if session.player().stamina.current < 20 {
            let time = session.rest()?;
            println!("Rested until {time} (day {}).", session.game_day());
        }

        let outing = session.explore().await?;
        print!("{turn}. ");
        match &outing.discovery {
            Discovery::Encounter(monster) => println!("A {} appears!", monster.name()),
            Discovery::FoundItems(items) => {
                let names: Vec<&str> = items.iter().map(|i| i.name()).collect();
                println!("Found {}.", names.join(", "));
            }
            Discovery::Event(event) => println!("Event: {event:?}"),
            Discovery::Nothing => println!("Nothing here."),
        }
        for event in &outing.events {
            println!("   {event}");
        }

        if session.in_battle() {
            let mut input = ScriptedInput::new([ActionChoice::Skill(0)]);
            for event in session.fight(&mut input)? {
                println!("   {event}");
            }
        }
    }

    let player = session.player();
    println!(
        "\nLevel {} | HP {} | Gold {} | Exp {}/{}",
        player.level(),
        player.character.hp,
        player.gold,
        player.experience,
        player.exp_to_next
    );
    for quest in &player.active_quests {
        println!(
            "Quest {}: {}/{}",
            quest.title, quest.current_progress, quest.required_progress
        );
    }
    Ok(())
}
