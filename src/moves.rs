use crate::model::Move;
use phf::phf_map;

pub const TACKLE: Move = Move {
    name: "Tackle",
    power: 20,
    move_type: "normal",
    description: "A physical attack",
    special: false,
};

pub const QUICK_ATTACK: Move = Move {
    name: "Quick Attack",
    power: 15,
    move_type: "normal",
    description: "A fast strike",
    special: false,
};

pub const REST: Move = Move {
    name: "Rest",
    power: 0,
    move_type: "normal",
    description: "Restores 30 HP (once per battle)",
    special: true,
};

const fn type_move(name: &'static str, power: i32, move_type: &'static str, description: &'static str) -> Move {
    Move {
        name,
        power,
        move_type,
        description,
        special: false,
    }
}

static TYPE_MOVES: phf::Map<&'static str, Move> = phf_map! {
    "fire" => type_move("Fire Attack", 30, "fire", "A small burst of flames"),
    "water" => type_move("Water Attack", 30, "water", "A small burst of water"),
    "grass" => type_move("Grass Attack", 30, "grass", "A swift vine attack"),
    "electric" => type_move("Electric Attack", 90, "electric", "A bolt of lightning"),
    "psychic" => type_move("Confusion Attack", 30, "psychic", "A psychic attack"),
    "poison" => type_move("Poison Attack", 30, "poison", "A poisonous sting"),
    "ground" => type_move("Ground Attack", 30, "ground", "A mud shot"),
    "rock" => type_move("Rock Attack", 30, "rock", "A rock throw"),
    "bug" => type_move("Bug Attack", 30, "bug", "A bug bite"),
    "ghost" => type_move("Ghost Attack", 30, "ghost", "A ghostly touch"),
    "fighting" => type_move("Fighting Attack", 30, "fighting", "A fierce strike"),
    "ice" => type_move("Ice Attack", 30, "ice", "A freezing blast"),
    "flying" => type_move("Flying Attack", 30, "flying", "A soaring strike"),
    "dragon" => type_move("Dragon Attack", 30, "dragon", "A dragon's breath"),
    "normal" => type_move("Normal Attack", 30, "normal", "A basic attack"),
};

const NORMAL_MOVE: Move = type_move("Normal Attack", 30, "normal", "A basic attack");

/// The type-specific attack; unknown types get the normal one.
pub fn type_move_for(elemental_type: &str) -> Move {
    let key = elemental_type.trim().to_ascii_lowercase();
    TYPE_MOVES.get(key.as_str()).copied().unwrap_or(NORMAL_MOVE)
}

/// Fixed four-move set for an elemental type, in display order.
pub fn moves_for(elemental_type: &str) -> [Move; 4] {
    [TACKLE, type_move_for(elemental_type), QUICK_ATTACK, REST]
}

pub fn known_types() -> impl Iterator<Item = &'static str> {
    TYPE_MOVES.keys().copied()
}
