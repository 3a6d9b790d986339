use minesweeper_agent as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_session(size: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::new(size as usize, size as usize, mines as usize)
        .map_err(|e| e.to_string())?;
    Ok(session.serialize())
}

/// Plays one agent turn and returns the updated session bytes.
#[wasm_bindgen]
pub fn advance(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts);
    session.step(&mut rand::rng()).map_err(|e| e.to_string())?;
    Ok(session.serialize())
}

/// The agent's view of the board, row by row: the observed count for played
/// cells, -2 for deduced mines, -1 for unknown cells.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Vec<i8> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts);
    let field = &session.field;
    let agent = &session.agent;
    (0..field.height)
        .flat_map(move |row| {
            (0..field.width).map(move |col| {
                let cell = ms::Point { row, col };
                if agent.moves_made.contains(&cell) {
                    field.nearby_mines(cell) as i8
                } else if agent.mines.contains(&cell) {
                    -2
                } else {
                    -1
                }
            })
        })
        .collect()
}

/// 0 = playing, 1 = won, 2 = lost.
#[wasm_bindgen]
pub fn get_state(bts: Vec<u8>) -> u8 {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts);
    match session.state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    }
}
