//! Turn state machine: the single owner and writer of a game session.
//!
//! A [`Game`] is built from a validated [`WorldSpec`], then set up with a
//! roster and limits. Each turn the current player performs exactly one
//! action; human players call the action methods directly, AI players act
//! through [`Game::ai_take_turn`]. Both kinds go through the same validation
//! and application path, followed by end-of-turn processing:
//!
//! 1. the target advances one room (while alive)
//! 2. the pet takes one wander step
//! 3. a dead target ends the game with the acting player as winner
//! 4. otherwise the turn number increments; past the limit nobody wins
//! 5. otherwise play passes to the next player
//!
//! Every rejected call returns an error and leaves the session untouched.

use log::{debug, info, warn};

use crate::ai::{Action, DecisionContext};
use crate::config::{build_roster, check_max_items, check_max_turn, validate_config};
use crate::config::{GameConfig, PlayerSetup};
use crate::constants::{
    FIRST_TURN, PET_START_ROOM, POKE_EYES_DAMAGE, TARGET_START_ROOM, WALL_THICKNESS,
};
use crate::entities::{Item, Pet, Player, PlayerKind, Room, TargetCharacter};
use crate::error::{GameError, GameResult, StateError, ValidationError};
use crate::geometry::{validate_rooms, AdjacencyTable, RoomRect};
use crate::pet::PetWander;
use crate::registry::Registry;
use crate::report::{
    LookAroundReport, Outcome, RoomContents, RoomReport, TurnEvent, TurnSummary, Weapon,
};
use crate::visibility::{self, Observers, Sighting};
use crate::world::{RoomSpec, WorldSpec};

/// Check a world description, returning every problem found.
pub fn check_world(spec: &WorldSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let invalid = |msg: &str| ValidationError::InvalidWorld(msg.to_string());

    if spec.name.trim().is_empty() {
        errors.push(invalid("world name is blank"));
    }
    if spec.rows == 0 || spec.cols == 0 {
        errors.push(invalid("world dimensions must be positive"));
    }
    if spec.target.name.trim().is_empty() {
        errors.push(invalid("target character name is blank"));
    }
    if spec.target.health == 0 {
        errors.push(invalid("target character health must be positive"));
    }
    if spec.pet_name.trim().is_empty() {
        errors.push(invalid("pet name is blank"));
    }
    if spec.rooms.is_empty() {
        errors.push(invalid("world has no rooms"));
    }

    let rects: Vec<RoomRect> = spec.rooms.iter().map(RoomSpec::rect).collect();
    errors.extend(validate_rooms(&rects));
    for (idx, room) in spec.rooms.iter().enumerate() {
        if room.name.trim().is_empty() {
            errors.push(ValidationError::MalformedRoom {
                room: idx,
                reason: "name is blank".into(),
            });
        }
    }

    for (idx, item) in spec.items.iter().enumerate() {
        if item.room >= spec.rooms.len() {
            errors.push(ValidationError::InvalidItem {
                item: idx,
                reason: format!("room #{} does not exist", item.room),
            });
        }
        if item.attack == 0 {
            errors.push(ValidationError::InvalidItem {
                item: idx,
                reason: "attack must be positive".into(),
            });
        }
        if item.name.trim().is_empty() {
            errors.push(ValidationError::InvalidItem {
                item: idx,
                reason: "name is blank".into(),
            });
        }
    }
    errors
}

/// One game session over a fixed world.
#[derive(Debug, Clone)]
pub struct Game {
    spec: WorldSpec,
    rooms: Vec<Room>,
    items: Vec<Item>,
    adjacency: AdjacencyTable,
    players: Vec<Player>,
    registry: Registry,
    target: TargetCharacter,
    pet: Pet,
    wander: PetWander,
    turn: u32,
    current: usize,
    /// 0 until configured.
    max_turn: u32,
    /// 0 until configured.
    max_items_carried: usize,
    seed: Option<u64>,
    outcome: Option<Outcome>,
    last_turn: Option<TurnSummary>,
}

impl Game {
    /// Validate the world and build a session with no players.
    pub fn new(spec: WorldSpec) -> GameResult<Self> {
        let errors = check_world(&spec);
        if let Some(first) = errors.first() {
            for e in &errors {
                warn!("World '{}' rejected: {}", spec.name, e);
            }
            return Err(first.clone().into());
        }
        let game = Self::fresh(spec);
        info!(
            "Loaded world '{}': {} rooms, {} items",
            game.spec.name,
            game.rooms.len(),
            game.items.len()
        );
        Ok(game)
    }

    fn fresh(spec: WorldSpec) -> Self {
        let rooms: Vec<Room> = spec
            .rooms
            .iter()
            .enumerate()
            .map(|(index, r)| Room {
                index,
                name: r.name.clone(),
                rect: r.rect(),
            })
            .collect();
        let rects: Vec<RoomRect> = rooms.iter().map(|r| r.rect).collect();
        let items: Vec<Item> = spec
            .items
            .iter()
            .enumerate()
            .map(|(index, i)| Item {
                index,
                name: i.name.clone(),
                attack: i.attack,
                origin_room: i.room,
                used: false,
            })
            .collect();
        let registry = Registry::new(&items, &[]);

        Self {
            adjacency: AdjacencyTable::build(&rects, WALL_THICKNESS),
            target: TargetCharacter {
                name: spec.target.name.clone(),
                health: spec.target.health,
                room: TARGET_START_ROOM,
            },
            pet: Pet {
                name: spec.pet_name.clone(),
                room: PET_START_ROOM,
            },
            rooms,
            items,
            players: Vec::new(),
            registry,
            wander: PetWander::new(),
            turn: FIRST_TURN,
            current: 0,
            max_turn: 0,
            max_items_carried: 0,
            seed: None,
            outcome: None,
            last_turn: None,
            spec,
        }
    }

    fn reject<T>(&self, err: impl Into<GameError>) -> GameResult<T> {
        let err = err.into();
        warn!("Turn {}: rejected: {}", self.turn, err);
        Err(err)
    }

    // ── Setup ───────────────────────────────────────────────────────────

    /// Rebuild the session from the loaded world: no players, no limits,
    /// everything back in its starting place.
    pub fn restart(&mut self) {
        let spec = self.spec.clone();
        *self = Self::fresh(spec);
        info!("Restarted '{}'", self.spec.name);
    }

    /// Return items, target and pet to their starting state and rewind to turn 1.
    fn reset_play(&mut self) {
        for item in &mut self.items {
            item.used = false;
        }
        self.target.health = self.spec.target.health;
        self.target.room = TARGET_START_ROOM;
        self.pet.room = PET_START_ROOM;
        self.wander.reset();
        self.turn = FIRST_TURN;
        self.current = 0;
        self.outcome = None;
        self.last_turn = None;
        self.registry = Registry::new(&self.items, &self.players);
    }

    /// Replace the roster and start play over. Randomized AI players are
    /// seeded from the configured seed, so configure before assigning players.
    pub fn set_players(&mut self, roster: Vec<PlayerSetup>) -> GameResult<()> {
        let players = match build_roster(&roster, self.rooms.len(), self.seed) {
            Ok(players) => players,
            Err(e) => return self.reject(e),
        };
        self.players = players;
        self.reset_play();
        info!(
            "New roster: {}",
            self.players
                .iter()
                .map(|p| format!("{} ({})", p.name, p.player_type()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }

    /// Change the turn limit. A finished game keeps its result; a limit below
    /// the current turn ends a game in progress with no winner.
    pub fn set_max_turn(&mut self, max_turn: u32) -> GameResult<()> {
        if let Err(e) = check_max_turn(max_turn) {
            return self.reject(e);
        }
        if self.is_game_over() {
            return self.reject(StateError::GameOver);
        }
        self.max_turn = max_turn;
        self.close_if_past_limit();
        Ok(())
    }

    pub fn set_max_items_carried(&mut self, max: usize) -> GameResult<()> {
        if let Err(e) = check_max_items(max, self.items.len()) {
            return self.reject(e);
        }
        self.max_items_carried = max;
        Ok(())
    }

    /// Apply all limits and the seed at once, or nothing.
    pub fn configure(&mut self, config: &GameConfig) -> GameResult<()> {
        let errors = validate_config(config, self.items.len());
        if let Some(first) = errors.first() {
            for e in &errors[1..] {
                warn!("Config rejected: {}", e);
            }
            return self.reject(first.clone());
        }
        if self.is_game_over() {
            return self.reject(StateError::GameOver);
        }
        self.max_turn = config.max_turn;
        self.max_items_carried = config.max_items_carried;
        self.seed = config.seed;
        self.close_if_past_limit();
        Ok(())
    }

    fn close_if_past_limit(&mut self) {
        if self.outcome.is_none() && !self.players.is_empty() && self.turn > self.max_turn {
            self.outcome = Some(Outcome::NoWinner);
            info!(
                "Game over at turn {}: limit lowered to {}",
                self.turn, self.max_turn
            );
        }
    }

    /// Roster assigned and both limits set.
    pub fn is_ready(&self) -> bool {
        !self.players.is_empty() && self.max_turn >= 1 && self.max_items_carried >= 1
    }

    fn ensure_can_act(&self) -> GameResult<()> {
        if self.players.is_empty() {
            return self.reject(StateError::NotReady("no players assigned"));
        }
        if self.max_turn < 1 {
            return self.reject(StateError::NotReady("max turn not set"));
        }
        if self.max_items_carried < 1 {
            return self.reject(StateError::NotReady("max items carried not set"));
        }
        if self.is_game_over() {
            return self.reject(StateError::GameOver);
        }
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn world_name(&self) -> &str {
        &self.spec.name
    }

    pub fn width(&self) -> u32 {
        self.spec.cols + 1
    }

    pub fn height(&self) -> u32 {
        self.spec.rows + 1
    }

    pub fn world(&self) -> &WorldSpec {
        &self.spec
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn target(&self) -> &TargetCharacter {
        &self.target
    }

    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn adjacency(&self) -> &AdjacencyTable {
        &self.adjacency
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn max_turn(&self) -> u32 {
        self.max_turn
    }

    pub fn max_items_carried(&self) -> usize {
        self.max_items_carried
    }

    pub fn current_player_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    fn check_room(&self, room: usize) -> Result<(), ValidationError> {
        if room >= self.rooms.len() {
            return Err(ValidationError::RoomOutOfRange {
                index: room,
                count: self.rooms.len(),
            });
        }
        Ok(())
    }

    fn check_item(&self, item: usize) -> Result<(), ValidationError> {
        if item >= self.items.len() {
            return Err(ValidationError::ItemOutOfRange {
                index: item,
                count: self.items.len(),
            });
        }
        Ok(())
    }

    fn check_player(&self, player: usize) -> Result<(), ValidationError> {
        if player >= self.players.len() {
            return Err(ValidationError::PlayerOutOfRange {
                index: player,
                count: self.players.len(),
            });
        }
        Ok(())
    }

    pub fn neighbors(&self, room: usize) -> GameResult<&[usize]> {
        self.check_room(room)?;
        Ok(self.adjacency.neighbors(room))
    }

    /// Items lying in a room.
    pub fn room_items(&self, room: usize) -> GameResult<Vec<usize>> {
        self.check_room(room)?;
        Ok(self.registry.items_in(room))
    }

    /// Players standing in a room.
    pub fn room_players(&self, room: usize) -> GameResult<Vec<usize>> {
        self.check_room(room)?;
        Ok(self.registry.players_in(room))
    }

    /// Items a player carries, in pickup order.
    pub fn carried_items(&self, player: usize) -> GameResult<&[usize]> {
        self.check_player(player)?;
        Ok(self.registry.carried(player))
    }

    /// Whether an attack by `player` from where they stand would be observed.
    pub fn sighting(&self, player: usize) -> GameResult<Sighting> {
        self.check_player(player)?;
        Ok(visibility::evaluate(
            &self.observers(),
            self.players[player].room,
        ))
    }

    fn observers(&self) -> Observers<'_> {
        Observers {
            adjacency: &self.adjacency,
            registry: &self.registry,
            pet_room: self.pet.room,
        }
    }

    // ── Game end ────────────────────────────────────────────────────────

    /// The target is dead or the turn counter has passed the limit.
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
            || !self.target.is_alive()
            || (self.max_turn >= 1 && self.turn > self.max_turn)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn describe_outcome(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Winner(p) => format!(
                "Target character is killed! Winner is {}.",
                self.players[p].name
            ),
            Outcome::NoWinner => "Target character slipped away! Nobody wins.".to_string(),
        }
    }

    pub fn result_text(&self) -> GameResult<String> {
        match self.outcome {
            Some(outcome) => Ok(self.describe_outcome(outcome)),
            None => self.reject(StateError::GameNotOver),
        }
    }

    // ── Text summaries ──────────────────────────────────────────────────

    fn room_contents(&self, room: usize) -> RoomContents {
        RoomContents {
            items: self
                .registry
                .items_in(room)
                .into_iter()
                .map(|i| (i, self.items[i].name.clone()))
                .collect(),
            players: self
                .registry
                .players_in(room)
                .into_iter()
                .map(|p| self.players[p].name.clone())
                .collect(),
            target: (self.target.room == room).then(|| self.target.to_string()),
            pet: (self.pet.room == room).then(|| self.pet.name.clone()),
        }
    }

    fn room_report(&self, room: usize, disclose: bool) -> RoomReport {
        RoomReport {
            index: room,
            name: self.rooms[room].name.clone(),
            contents: disclose.then(|| self.room_contents(room)),
        }
    }

    fn look_around_report(&self, player: usize) -> LookAroundReport {
        let room = self.players[player].room;
        LookAroundReport {
            current: self.room_report(room, true),
            neighbors: self
                .adjacency
                .neighbors(room)
                .iter()
                .map(|&n| self.room_report(n, n != self.pet.room))
                .collect(),
        }
    }

    /// Full description of a room: geometry, contents and neighbors.
    pub fn room_info(&self, room: usize) -> GameResult<String> {
        if let Err(e) = self.check_room(room) {
            return self.reject(e);
        }
        let mut out = format!("{}\n", self.rooms[room]);
        let items = self.registry.items_in(room);
        if !items.is_empty() {
            out.push_str(&format!("--{} items are in the room:\n", items.len()));
            for i in items {
                out.push_str(&format!("\t{}\n", self.items[i]));
            }
        }
        if self.target.room == room {
            out.push_str(&format!(
                "--Target character is in the room:\n\t{}\n",
                self.target
            ));
        }
        if self.pet.room == room {
            out.push_str(&format!("--Pet is in the room:\n\t{}\n", self.pet.name));
        }
        let players = self.registry.players_in(room);
        if !players.is_empty() {
            out.push_str(&format!("--{} players are in the room:\n", players.len()));
            for p in players {
                out.push_str(&format!("\t{}\n", self.players[p].name));
            }
        }
        let neighbors = self.adjacency.neighbors(room);
        if !neighbors.is_empty() {
            out.push_str(&format!("--{} adjacent rooms:\n", neighbors.len()));
            for &n in neighbors {
                out.push_str(&format!(
                    "\tRoom index:{}. Name:{}.\n",
                    n, self.rooms[n].name
                ));
            }
        }
        Ok(out)
    }

    pub fn player_info(&self, player: usize) -> GameResult<String> {
        if let Err(e) = self.check_player(player) {
            return self.reject(e);
        }
        let mut out = format!("{}\n", self.players[player]);
        let carried = self.registry.carried(player);
        if carried.is_empty() {
            out.push_str("No item carried.\n");
        } else {
            out.push_str(&format!("Carried {} item(s):\n", carried.len()));
            for &i in carried {
                out.push_str(&format!("{}\n", self.items[i]));
            }
        }
        Ok(out)
    }

    /// Who is up, what they carry and where they stand.
    pub fn turn_info(&self) -> GameResult<String> {
        if self.players.is_empty() {
            return self.reject(StateError::NotReady("no players assigned"));
        }
        if self.is_game_over() {
            return self.reject(StateError::GameOver);
        }
        let player = &self.players[self.current];
        let mut out = format!(
            "Current turn is {}\nCurrent player is {}, order is {}\n{} carries {} items, is in {}-indexed room {}\n",
            self.turn,
            player.name,
            self.current,
            player.name,
            self.registry.carried(self.current).len(),
            player.room,
            self.rooms[player.room].name
        );
        out.push_str(&self.room_info(player.room)?);
        Ok(out)
    }

    pub fn last_turn(&self) -> Option<&TurnSummary> {
        self.last_turn.as_ref()
    }

    /// Text of the most recent turn, empty before the first action.
    pub fn last_turn_message(&self) -> String {
        self.last_turn
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default()
    }

    /// Check derived tables and positions against the primary state.
    pub fn audit(&self) -> Vec<String> {
        let mut problems = self.registry.audit(&self.items, &self.players);
        if self.target.room >= self.rooms.len() {
            problems.push(format!("target in unknown room #{}", self.target.room));
        }
        if self.pet.room >= self.rooms.len() {
            problems.push(format!("pet in unknown room #{}", self.pet.room));
        }
        for (idx, p) in self.players.iter().enumerate() {
            if p.room >= self.rooms.len() {
                problems.push(format!("player #{} in unknown room #{}", idx, p.room));
            }
        }
        if !self.players.is_empty() && self.current >= self.players.len() {
            problems.push(format!("current player #{} out of range", self.current));
        }
        problems
    }

    // ── Human actions ───────────────────────────────────────────────────

    /// Move the current human player to a neighboring room.
    pub fn move_player(&mut self, room: usize) -> GameResult<TurnSummary> {
        self.human_turn(Action::Move(room))
    }

    pub fn pickup_item(&mut self, item: usize) -> GameResult<TurnSummary> {
        self.human_turn(Action::PickupItem(item))
    }

    pub fn look_around(&mut self) -> GameResult<TurnSummary> {
        self.human_turn(Action::LookAround)
    }

    /// Relocate the pet to any room; its wander restarts from there.
    pub fn move_pet(&mut self, room: usize) -> GameResult<TurnSummary> {
        self.human_turn(Action::MovePet(room))
    }

    /// Attack the target with a carried item, or bare-handed with `None`.
    pub fn attack(&mut self, item: Option<usize>) -> GameResult<TurnSummary> {
        self.human_turn(Action::Attack(item))
    }

    fn human_turn(&mut self, action: Action) -> GameResult<TurnSummary> {
        self.ensure_can_act()?;
        if !self.players[self.current].is_human() {
            return self.reject(StateError::NotHumanTurn);
        }
        self.play(action)
    }

    // ── AI actions ──────────────────────────────────────────────────────

    fn decision_context(&self, player: usize) -> DecisionContext {
        let room = self.players[player].room;
        DecisionContext {
            room,
            target_room: self.target.room,
            unseen: !visibility::evaluate(&self.observers(), room).is_seen(),
            neighbors: self.adjacency.neighbors(room).to_vec(),
            room_items: self.registry.items_in(room),
            carried: self
                .registry
                .carried(player)
                .iter()
                .map(|&i| (i, self.items[i].attack))
                .collect(),
            max_items_carried: self.max_items_carried,
            room_count: self.rooms.len(),
            pet_room: self.pet.room,
        }
    }

    /// Let the current AI player decide and perform its action.
    pub fn ai_take_turn(&mut self) -> GameResult<TurnSummary> {
        self.ensure_can_act()?;
        let actor = self.current;
        if self.players[actor].is_human() {
            return self.reject(StateError::NotAiTurn);
        }
        let ctx = self.decision_context(actor);
        let action = match &mut self.players[actor].kind {
            PlayerKind::Ai(policy) => policy.decide(&ctx),
            PlayerKind::Human => return Err(StateError::NotAiTurn.into()),
        };
        debug!("{} decided on {}", self.players[actor].name, action);

        self.play(action)
    }

    // ── Shared application path ─────────────────────────────────────────

    fn validate(&self, player: usize, action: Action) -> Result<(), ValidationError> {
        let room = self.players[player].room;
        match action {
            Action::Move(to) => {
                self.check_room(to)?;
                if to == room {
                    return Err(ValidationError::SameRoom { room });
                }
                if !self.adjacency.are_adjacent(room, to) {
                    return Err(ValidationError::NotAdjacent { from: room, to });
                }
            }
            Action::PickupItem(item) => {
                self.check_item(item)?;
                if self.items[item].used {
                    return Err(ValidationError::ItemAlreadyUsed { item });
                }
                if !self.registry.room_has_item(room, item) {
                    return Err(ValidationError::ItemNotInRoom { item, room });
                }
                if self.registry.carried(player).len() >= self.max_items_carried {
                    return Err(ValidationError::AtCapacity {
                        max: self.max_items_carried,
                    });
                }
            }
            Action::LookAround | Action::Attack(None) => {}
            Action::MovePet(to) => self.check_room(to)?,
            Action::Attack(Some(item)) => {
                self.check_item(item)?;
                if self.items[item].used {
                    return Err(ValidationError::ItemAlreadyUsed { item });
                }
                if !self.registry.carries(player, item) {
                    return Err(ValidationError::ItemNotCarried { item });
                }
            }
        }
        Ok(())
    }

    /// Validate, apply and finish the current player's turn.
    fn play(&mut self, action: Action) -> GameResult<TurnSummary> {
        let actor = self.current;
        if let Err(e) = self.validate(actor, action) {
            return self.reject(e);
        }
        let turn = self.turn;
        let name = self.players[actor].name.clone();
        let mut events = Vec::new();
        let mut look = None;

        match action {
            Action::Move(to) => {
                let from = self.players[actor].room;
                self.registry.move_player(actor, from, to);
                self.players[actor].room = to;
                events.push(TurnEvent::Moved {
                    from,
                    to,
                    room_name: self.rooms[to].name.clone(),
                });
            }
            Action::PickupItem(item) => {
                let room = self.players[actor].room;
                self.registry.pick_up(actor, room, item);
                events.push(TurnEvent::PickedUp {
                    item,
                    name: self.items[item].name.clone(),
                    attack: self.items[item].attack,
                });
            }
            Action::LookAround => {
                look = Some(self.look_around_report(actor));
                events.push(TurnEvent::LookedAround);
            }
            Action::MovePet(to) => {
                self.pet.room = to;
                self.wander.reset();
                events.push(TurnEvent::PetRelocated {
                    to,
                    room_name: self.rooms[to].name.clone(),
                });
            }
            Action::Attack(item) => self.resolve_attack(actor, item, &mut events),
        }
        info!("Turn {}: {} plays {}", turn, name, action);

        self.finish_turn(actor, &mut events);
        let summary = TurnSummary {
            turn,
            player: name,
            action,
            events,
            look,
        };
        self.last_turn = Some(summary.clone());
        Ok(summary)
    }

    fn resolve_attack(&mut self, actor: usize, item: Option<usize>, events: &mut Vec<TurnEvent>) {
        let room = self.players[actor].room;
        let sighting = visibility::evaluate(&self.observers(), room);
        let (weapon, damage) = match item {
            Some(i) => (
                Weapon::Item {
                    index: i,
                    name: self.items[i].name.clone(),
                },
                self.items[i].attack,
            ),
            None => (Weapon::BareHands, POKE_EYES_DAMAGE),
        };

        if sighting.is_seen() {
            debug!("Attack from room #{} seen: {:?}", room, sighting);
            events.push(TurnEvent::AttackSeen { weapon });
        } else {
            self.target.take_damage(damage);
            events.push(TurnEvent::AttackLanded {
                weapon,
                damage,
                health: self.target.health,
            });
        }

        if let Some(i) = item {
            self.items[i].used = true;
            self.registry.discard(actor, i);
            events.push(TurnEvent::ItemUsedUp {
                item: i,
                name: self.items[i].name.clone(),
            });
        }
    }

    fn finish_turn(&mut self, actor: usize, events: &mut Vec<TurnEvent>) {
        if self.target.is_alive() {
            let from = self.target.room;
            self.target.advance(self.rooms.len());
            debug!("Target moved {} -> {}", from, self.target.room);
            events.push(TurnEvent::TargetMoved {
                from,
                to: self.target.room,
            });
        }

        match self.wander.step(&self.adjacency, self.pet.room) {
            Some(to) => {
                debug!("Pet wandered {} -> {}", self.pet.room, to);
                self.pet.room = to;
                events.push(TurnEvent::PetWandered { to });
            }
            None => events.push(TurnEvent::PetStayed {
                room: self.pet.room,
            }),
        }

        if !self.target.is_alive() {
            self.end_game(Outcome::Winner(actor), events);
            return;
        }
        self.turn += 1;
        if self.turn > self.max_turn {
            self.end_game(Outcome::NoWinner, events);
            return;
        }
        self.current = (self.current + 1) % self.players.len();
        events.push(TurnEvent::NextPlayer {
            turn: self.turn,
            player: self.players[self.current].name.clone(),
        });
    }

    fn end_game(&mut self, outcome: Outcome, events: &mut Vec<TurnEvent>) {
        self.outcome = Some(outcome);
        let text = self.describe_outcome(outcome);
        info!("Game over after turn {}: {}", self.turn, text);
        events.push(TurnEvent::GameEnded(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ItemSpec, TargetSpec};

    /// Hall(0) - Den(1) - Bath(2) in a row, Yard(3) below the hall.
    fn world(health: u32) -> WorldSpec {
        let room = |top, left, bottom, right, name: &str| RoomSpec {
            top,
            left,
            bottom,
            right,
            name: name.into(),
        };
        let item = |room, attack, name: &str| ItemSpec {
            room,
            attack,
            name: name.into(),
        };
        WorldSpec {
            name: "Test House".into(),
            rows: 10,
            cols: 12,
            target: TargetSpec {
                name: "Boss".into(),
                health,
            },
            pet_name: "Cat".into(),
            rooms: vec![
                room(0, 0, 3, 3, "Hall"),
                room(0, 4, 3, 7, "Den"),
                room(0, 8, 3, 11, "Bath"),
                room(4, 0, 6, 3, "Yard"),
            ],
            items: vec![item(0, 3, "Knife"), item(0, 1, "Spoon"), item(1, 5, "Axe")],
        }
    }

    fn game_with(health: u32, roster: Vec<PlayerSetup>) -> Game {
        let mut g = Game::new(world(health)).unwrap();
        g.set_max_turn(10).unwrap();
        g.set_max_items_carried(2).unwrap();
        g.set_players(roster).unwrap();
        g
    }

    fn two_humans(a: usize, b: usize) -> Game {
        game_with(
            10,
            vec![PlayerSetup::human("A", a), PlayerSetup::human("B", b)],
        )
    }

    #[test]
    fn test_adjacency_from_geometry() {
        let g = Game::new(world(10)).unwrap();
        assert_eq!(g.neighbors(0).unwrap(), &[1, 3]);
        assert_eq!(g.neighbors(1).unwrap(), &[0, 2]);
        assert_eq!(g.neighbors(3).unwrap(), &[0]);
        assert_eq!((g.width(), g.height()), (13, 11));
        assert!(g.neighbors(4).is_err());
    }

    #[test]
    fn test_new_rejects_bad_worlds() {
        let mut overlapping = world(10);
        overlapping.rooms.push(overlapping.rooms[0].clone());
        assert_eq!(
            Game::new(overlapping).unwrap_err(),
            GameError::Validation(ValidationError::RoomsOverlap { a: 0, b: 4 })
        );

        let mut bad_item = world(10);
        bad_item.items[1].room = 9;
        assert!(Game::new(bad_item).is_err());

        assert!(Game::new(world(0)).is_err());

        let mut empty = world(10);
        empty.rooms.clear();
        empty.items.clear();
        assert_eq!(check_world(&empty).len(), 1);
    }

    #[test]
    fn test_actions_require_ready_session() {
        let mut g = Game::new(world(10)).unwrap();
        assert_eq!(
            g.look_around().unwrap_err(),
            GameError::State(StateError::NotReady("no players assigned"))
        );
        g.set_players(vec![PlayerSetup::human("A", 0)]).unwrap();
        assert!(matches!(
            g.look_around(),
            Err(GameError::State(StateError::NotReady(_)))
        ));
        assert!(g.set_max_items_carried(4).is_err());
        assert!(g.set_max_turn(0).is_err());
    }

    #[test]
    fn test_move_runs_end_of_turn() {
        let mut g = two_humans(0, 2);
        let summary = g.move_player(1).unwrap();
        assert_eq!(g.players()[0].room, 1);
        assert_eq!(g.room_players(1).unwrap(), vec![0]);
        assert_eq!(g.turn(), 2);
        assert_eq!(g.current_player_index(), 1);
        assert_eq!(g.target().room, 1);
        assert_eq!(g.pet().room, 1);
        assert_eq!(
            summary.events,
            vec![
                TurnEvent::Moved {
                    from: 0,
                    to: 1,
                    room_name: "Den".into()
                },
                TurnEvent::TargetMoved { from: 0, to: 1 },
                TurnEvent::PetWandered { to: 1 },
                TurnEvent::NextPlayer {
                    turn: 2,
                    player: "B".into()
                },
            ]
        );
        assert_eq!(g.last_turn_message(), summary.to_string());
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut g = two_humans(0, 2);
        let before = g.audit();
        assert!(matches!(
            g.move_player(2),
            Err(GameError::Validation(ValidationError::NotAdjacent { from: 0, to: 2 }))
        ));
        assert!(matches!(
            g.move_player(0),
            Err(GameError::Validation(ValidationError::SameRoom { room: 0 }))
        ));
        assert!(g.move_player(9).is_err());
        assert!(matches!(
            g.pickup_item(2),
            Err(GameError::Validation(ValidationError::ItemNotInRoom { item: 2, room: 0 }))
        ));
        assert!(matches!(
            g.attack(Some(0)),
            Err(GameError::Validation(ValidationError::ItemNotCarried { item: 0 }))
        ));
        assert!(g.move_pet(4).is_err());
        assert_eq!(g.turn(), 1);
        assert_eq!(g.current_player_index(), 0);
        assert_eq!(g.target().room, 0);
        assert!(before.is_empty() && g.audit().is_empty());
        assert!(g.last_turn().is_none());
    }

    #[test]
    fn test_pickup_respects_capacity() {
        let mut g = two_humans(0, 2);
        g.set_max_items_carried(1).unwrap();
        g.pickup_item(0).unwrap();
        assert_eq!(g.carried_items(0).unwrap(), &[0]);
        assert_eq!(g.room_items(0).unwrap(), vec![1]);
        g.look_around().unwrap();
        assert_eq!(
            g.pickup_item(1).unwrap_err(),
            GameError::Validation(ValidationError::AtCapacity { max: 1 })
        );
        assert!(g.audit().is_empty());
    }

    #[test]
    fn test_wrong_actor_kind() {
        let mut g = game_with(
            10,
            vec![
                PlayerSetup::scripted("Bot", 0, &["LOOK_AROUND"]),
                PlayerSetup::human("A", 2),
            ],
        );
        assert_eq!(
            g.look_around().unwrap_err(),
            GameError::State(StateError::NotHumanTurn)
        );
        g.ai_take_turn().unwrap();
        assert_eq!(
            g.ai_take_turn().unwrap_err(),
            GameError::State(StateError::NotAiTurn)
        );
    }

    #[test]
    fn test_unseen_bare_handed_attack() {
        // Yard's only neighbor holds the pet, and nobody else is around.
        let mut g = game_with(10, vec![PlayerSetup::human("A", 3)]);
        assert!(!g.sighting(0).unwrap().is_seen());
        let summary = g.attack(None).unwrap();
        assert_eq!(g.target().health, 9);
        assert_eq!(
            summary.events[0],
            TurnEvent::AttackLanded {
                weapon: Weapon::BareHands,
                damage: 1,
                health: 9
            }
        );
    }

    #[test]
    fn test_seen_attack_still_uses_item() {
        let mut g = two_humans(0, 0);
        g.pickup_item(0).unwrap();
        g.look_around().unwrap();
        assert!(g.sighting(0).unwrap().by_players);
        let summary = g.attack(Some(0)).unwrap();
        assert_eq!(g.target().health, 10);
        assert!(g.items()[0].used);
        assert!(g.carried_items(0).unwrap().is_empty());
        assert!(matches!(summary.events[0], TurnEvent::AttackSeen { .. }));
        assert!(g.audit().is_empty());
    }

    #[test]
    fn test_killing_blow_ends_game() {
        let mut g = game_with(1, vec![PlayerSetup::human("A", 3)]);
        assert!(g.result_text().is_err());
        let summary = g.attack(None).unwrap();
        assert!(summary.ended_game());
        assert!(g.is_game_over());
        assert_eq!(g.outcome(), Some(Outcome::Winner(0)));
        assert_eq!(g.target().room, 0);
        assert_eq!(g.turn(), 1);
        assert_eq!(
            g.result_text().unwrap(),
            "Target character is killed! Winner is A."
        );
        assert_eq!(
            g.look_around().unwrap_err(),
            GameError::State(StateError::GameOver)
        );
        assert!(g.turn_info().is_err());
    }

    #[test]
    fn test_turn_limit_means_no_winner() {
        let mut g = game_with(10, vec![PlayerSetup::human("A", 0)]);
        g.set_max_turn(2).unwrap();
        g.look_around().unwrap();
        assert!(!g.is_game_over());
        g.look_around().unwrap();
        assert!(g.is_game_over());
        assert_eq!(g.turn(), 3);
        assert_eq!(g.outcome(), Some(Outcome::NoWinner));
        assert_eq!(
            g.result_text().unwrap(),
            "Target character slipped away! Nobody wins."
        );
    }

    #[test]
    fn test_lowering_limit_below_turn_ends_game() {
        let mut g = game_with(10, vec![PlayerSetup::human("A", 0)]);
        for _ in 0..4 {
            g.look_around().unwrap();
        }
        assert_eq!(g.turn(), 5);
        assert!(!g.is_game_over());

        g.set_max_turn(2).unwrap();
        assert!(g.is_game_over());
        assert_eq!(g.outcome(), Some(Outcome::NoWinner));
        assert_eq!(
            g.result_text().unwrap(),
            "Target character slipped away! Nobody wins."
        );
        assert_eq!(
            g.look_around().unwrap_err(),
            GameError::State(StateError::GameOver)
        );
        assert_eq!(g.turn(), 5);
    }

    #[test]
    fn test_game_over_never_reverts() {
        let mut g = game_with(10, vec![PlayerSetup::human("A", 0)]);
        g.set_max_turn(1).unwrap();
        g.look_around().unwrap();
        assert!(g.is_game_over());

        assert_eq!(
            g.set_max_turn(50).unwrap_err(),
            GameError::State(StateError::GameOver)
        );
        assert!(g.configure(&GameConfig::default()).is_err());
        assert!(g.is_game_over());
        assert_eq!(g.max_turn(), 1);
        assert_eq!(g.outcome(), Some(Outcome::NoWinner));

        // a new roster starts a new game
        g.set_players(vec![PlayerSetup::human("B", 1)]).unwrap();
        assert!(!g.is_game_over());
        assert_eq!(g.outcome(), None);
    }

    #[test]
    fn test_limit_equal_to_turn_allows_one_more() {
        let mut g = game_with(10, vec![PlayerSetup::human("A", 0)]);
        g.look_around().unwrap();
        g.look_around().unwrap();
        g.set_max_turn(3).unwrap();
        assert!(!g.is_game_over());
        g.look_around().unwrap();
        assert!(g.is_game_over());
        assert_eq!(g.turn(), 4);
    }

    #[test]
    fn test_move_pet_restarts_wander() {
        let mut g = two_humans(0, 2);
        let summary = g.move_pet(2).unwrap();
        // fresh traversal rooted at Bath, whose only neighbor is Den
        assert_eq!(g.pet().room, 1);
        assert!(summary.events.contains(&TurnEvent::PetWandered { to: 1 }));
    }

    #[test]
    fn test_look_around_hides_pet_room() {
        let mut g = two_humans(3, 2);
        let summary = g.look_around().unwrap();
        let look = summary.look.unwrap();
        assert_eq!(look.current.index, 3);
        assert!(!look.current.is_concealed());
        assert_eq!(look.neighbors.len(), 1);
        assert!(look.neighbors[0].is_concealed());
    }

    #[test]
    fn test_scripted_ai_replays_in_order() {
        let mut g = game_with(
            10,
            vec![
                PlayerSetup::scripted("Bot", 0, &["PICKUP_ITEM", "1", "MOVE", "1"]),
                PlayerSetup::human("A", 2),
            ],
        );
        assert_eq!(g.ai_take_turn().unwrap().action, Action::PickupItem(1));
        g.look_around().unwrap();
        assert_eq!(g.ai_take_turn().unwrap().action, Action::Move(1));
        assert_eq!(g.carried_items(0).unwrap(), &[1]);
        assert_eq!(g.players()[0].room, 1);
    }

    #[test]
    fn test_rejected_script_step_is_skipped() {
        let mut g = game_with(
            10,
            vec![PlayerSetup::scripted("Bot", 0, &["MOVE", "2", "LOOK_AROUND"])],
        );
        for turn in 1..=3 {
            assert!(matches!(
                g.ai_take_turn(),
                Err(GameError::Validation(ValidationError::NotAdjacent { .. }))
            ));
            assert_eq!(g.turn(), turn);
            let summary = g.ai_take_turn().unwrap();
            assert_eq!((summary.turn, summary.action), (turn, Action::LookAround));
        }
        assert_eq!(g.turn(), 4);
        assert_eq!(g.players()[0].room, 0);
    }

    fn seeded_session(seed: u64) -> Vec<String> {
        let mut g = Game::new(world(10)).unwrap();
        g.configure(&GameConfig {
            max_turn: 30,
            max_items_carried: 2,
            seed: Some(seed),
        })
        .unwrap();
        g.set_players(vec![PlayerSetup::ai("R1", 0), PlayerSetup::ai("R2", 2)])
            .unwrap();
        let mut log = Vec::new();
        while !g.is_game_over() {
            log.push(g.ai_take_turn().unwrap().to_string());
            assert!(g.audit().is_empty(), "{:?}", g.audit());
        }
        log
    }

    #[test]
    fn test_seeded_random_sessions_repeat() {
        let first = seeded_session(17);
        assert!(!first.is_empty() && first.len() <= 30);
        assert_eq!(first, seeded_session(17));
    }

    #[test]
    fn test_set_players_resets_play() {
        let mut g = two_humans(0, 1);
        g.pickup_item(0).unwrap();
        g.pickup_item(2).unwrap();
        g.set_players(vec![PlayerSetup::human("C", 1)]).unwrap();
        assert_eq!(g.turn(), 1);
        assert_eq!(g.room_items(0).unwrap(), vec![0, 1]);
        assert_eq!(g.room_items(1).unwrap(), vec![2]);
        assert_eq!((g.target().room, g.pet().room), (0, 0));
        assert!(g.audit().is_empty());
    }

    #[test]
    fn test_restart_clears_session() {
        let mut g = two_humans(0, 1);
        g.look_around().unwrap();
        g.restart();
        assert!(g.players().is_empty());
        assert!(!g.is_ready());
        assert_eq!((g.turn(), g.max_turn()), (1, 0));
        assert!(g.audit().is_empty());
    }

    #[test]
    fn test_configure_is_all_or_nothing() {
        let mut g = Game::new(world(10)).unwrap();
        let bad = GameConfig {
            max_turn: 5,
            max_items_carried: 9,
            seed: None,
        };
        assert!(g.configure(&bad).is_err());
        assert_eq!(g.max_turn(), 0);
        g.configure(&GameConfig::default()).unwrap();
        assert_eq!((g.max_turn(), g.max_items_carried()), (20, 2));
    }

    #[test]
    fn test_info_texts() {
        let g = two_humans(0, 1);
        let turn = g.turn_info().unwrap();
        assert!(turn.starts_with(
            "Current turn is 1\nCurrent player is A, order is 0\nA carries 0 items, is in 0-indexed room Hall\n"
        ));
        let room = g.room_info(0).unwrap();
        assert!(room.starts_with(
            "Room index:0. Name:Hall. Left-top:{0,0}. Right-bottom:{3,3}. Width:4. Height:4.\n"
        ));
        assert!(room.contains("--2 items are in the room:\n\tIndex:0. Name:Knife. RoomIdx:0. Attack:3.\n"));
        assert!(room.contains("--Pet is in the room:\n\tCat\n"));
        assert!(room.contains("--2 adjacent rooms:\n"));
        assert_eq!(
            g.player_info(1).unwrap(),
            "Player name:B. Room index:1. Type: HUMAN\nNo item carried.\n"
        );
        assert!(g.player_info(2).is_err());
    }
}
