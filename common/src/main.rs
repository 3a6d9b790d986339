use minesweeper_agent::*;
use std::thread;
use std::time::Duration;

fn main() {
    // --- 1. Initialization ---
    let mut rng = rand::rng();
    let field = Minefield::generate(8, 8, 8, &mut rng).expect("valid board parameters");
    let mut agent = Agent::new(8, 8);
    let mut state = GameState::Playing;

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: play cells proven safe, guess randomly otherwise.");
    thread::sleep(Duration::from_secs(1));

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        // --- 3. Bot's Decision Logic ---
        let cell = if let Some(cell) = agent.make_safe_move() {
            println!("Logic found a guaranteed safe cell.");
            cell
        } else if let Some(cell) = agent.make_random_move(&mut rng) {
            println!("No provably safe move. Making a random guess...");
            cell
        } else {
            // Every unplayed cell is a known mine: the board is cleared.
            println!("Only known mines remain.");
            state = GameState::Won;
            break;
        };

        // --- 4. Execute the Chosen Move ---
        println!("Bot plays ({}, {})...", cell.row, cell.col);

        if field.is_mine(cell) {
            state = GameState::Lost;
            break;
        }

        agent
            .observe(cell, field.nearby_mines(cell))
            .expect("knowledge base stays consistent on honest observations");

        if field.is_cleared(agent.moves_made.len()) {
            state = GameState::Won;
        }

        print_board(&field, &agent);
        thread::sleep(Duration::from_millis(300));
    }

    // --- 5. Final Result ---
    println!("\n--- Game Over ---");
    println!(
        "Deduced {} of {} mines in {} moves.",
        agent.mines.len(),
        field.total_mines(),
        move_count
    );

    match state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
}

/// Prints the agent's view of the board: counts for played cells, a flag for
/// every deduced mine, and a block for anything still unknown.
fn print_board(field: &Minefield, agent: &Agent) {
    // Print header
    print!("   ");
    for col in 0..field.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(field.width));

    // Print rows
    for row in 0..field.height {
        print!("{:^2}|", row);
        for col in 0..field.width {
            let cell = Point { row, col };
            let display = if agent.moves_made.contains(&cell) {
                format!(" {} ", field.nearby_mines(cell))
            } else if agent.mines.contains(&cell) {
                " ⚑ ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
