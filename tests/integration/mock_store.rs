//! Mock store for integration testing.
//!
//! Provides a deterministic implementation of every repository trait —
//! known carts, games, users, and tokens, all in-memory with no external
//! dependencies. A `force_error` switch makes the bet store fail its
//! bulk insert for atomicity tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;

use tgl::store::{BetStore, CartStore, GameStore, SessionAuth};
use tgl::types::{AuthUser, Bet, BetDraft, BetError, Cart, Game, NewGame};

pub struct MockStore {
    games: Mutex<HashMap<i64, Game>>,
    carts: Mutex<HashMap<i64, Cart>>,
    bets: Mutex<Vec<Bet>>,
    /// token -> user
    tokens: Mutex<HashMap<String, AuthUser>>,
    next_game_id: Mutex<i64>,
    next_bet_id: Mutex<i64>,
    /// If set, bulk_create returns this storage error.
    force_error: Mutex<Option<String>>,
}

fn cart(id: i64, min_value: Decimal) -> Cart {
    Cart {
        id,
        min_value,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn game(id: i64, game_type: &str, range: i64, max_number: i64, price: Decimal, cart_id: i64) -> Game {
    Game {
        id,
        game_type: game_type.to_string(),
        description: format!("Pick {max_number} numbers from 1 to {range}."),
        color: "#01AC66".to_string(),
        range,
        max_number,
        price,
        cart_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn auth_user(id: i64, username: &str, is_admin: bool) -> AuthUser {
    AuthUser {
        id,
        username: username.to_string(),
        email: format!("{username}@tgl.com"),
        is_admin,
    }
}

impl MockStore {
    /// Seeded fixture: cart 1 (min R$ 10) holds Mega-Sena (id 2: pick 6
    /// of 1..=60 at R$ 4,50) and Quina (id 1); cart 2 (min R$ 5) holds
    /// Lotofácil (id 3). Tokens: `user-token` (alice), `bob-token`
    /// (bob), `admin-token` (root, admin).
    pub fn seeded() -> Self {
        let games = HashMap::from([
            (1, game(1, "Quina", 80, 5, dec!(2.00), 1)),
            (2, game(2, "Mega-Sena", 60, 6, dec!(4.50), 1)),
            (3, game(3, "Lotofácil", 25, 15, dec!(2.50), 2)),
        ]);
        let carts = HashMap::from([(1, cart(1, dec!(10))), (2, cart(2, dec!(5)))]);
        let tokens = HashMap::from([
            ("user-token".to_string(), auth_user(1, "alice", false)),
            ("bob-token".to_string(), auth_user(2, "bob", false)),
            ("admin-token".to_string(), auth_user(3, "root", true)),
        ]);

        Self {
            games: Mutex::new(games),
            carts: Mutex::new(carts),
            bets: Mutex::new(Vec::new()),
            tokens: Mutex::new(tokens),
            next_game_id: Mutex::new(4),
            next_bet_id: Mutex::new(1),
            force_error: Mutex::new(None),
        }
    }

    /// Force the next bulk inserts to fail with a storage error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Number of persisted bet rows.
    pub fn bets_len(&self) -> usize {
        self.bets.lock().unwrap().len()
    }

    /// Re-price a game after the fact, for price-snapshot tests.
    pub fn set_game_price(&self, id: i64, price: Decimal) {
        if let Some(g) = self.games.lock().unwrap().get_mut(&id) {
            g.price = price;
        }
    }
}

#[async_trait]
impl GameStore for MockStore {
    async fn find(&self, id: i64) -> Result<Option<Game>, BetError> {
        Ok(self.games.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_type(&self, game_type: &str) -> Result<Option<Game>, BetError> {
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .find(|g| g.game_type == game_type)
            .cloned())
    }

    async fn list_by_cart(&self, cart_id: i64) -> Result<Vec<Game>, BetError> {
        let mut games: Vec<Game> = self
            .games
            .lock()
            .unwrap()
            .values()
            .filter(|g| g.cart_id == cart_id)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.id);
        Ok(games)
    }

    async fn create(&self, new: NewGame) -> Result<Game, BetError> {
        let mut games = self.games.lock().unwrap();
        if games.values().any(|g| g.game_type == new.game_type) {
            return Err(BetError::GameTypeTaken);
        }
        let mut next = self.next_game_id.lock().unwrap();
        let id = *next;
        *next += 1;

        let game = Game {
            id,
            game_type: new.game_type,
            description: new.description,
            color: new.color,
            range: new.range,
            max_number: new.max_number,
            price: new.price,
            cart_id: new.cart_id.unwrap_or(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        games.insert(id, game.clone());
        Ok(game)
    }

    async fn update(&self, id: i64, new: NewGame) -> Result<Game, BetError> {
        let mut games = self.games.lock().unwrap();
        if games
            .values()
            .any(|g| g.game_type == new.game_type && g.id != id)
        {
            return Err(BetError::GameTypeTaken);
        }
        let game = games.get_mut(&id).ok_or(BetError::GameNotFound)?;
        game.game_type = new.game_type;
        game.description = new.description;
        game.color = new.color;
        game.range = new.range;
        game.max_number = new.max_number;
        game.price = new.price;
        game.updated_at = Utc::now();
        Ok(game.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), BetError> {
        self.games
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(BetError::GameNotFound)
    }
}

#[async_trait]
impl CartStore for MockStore {
    async fn find(&self, id: i64) -> Result<Option<Cart>, BetError> {
        Ok(self.carts.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl BetStore for MockStore {
    async fn bulk_create(&self, drafts: &[BetDraft]) -> Result<Vec<Bet>, BetError> {
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(BetError::Storage(msg));
        }

        let now = Utc::now();
        let mut bets = self.bets.lock().unwrap();
        let mut next = self.next_bet_id.lock().unwrap();
        let mut created = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let bet = Bet {
                id: *next,
                user_id: draft.user_id,
                game_id: draft.game_id,
                chosen_numbers: draft.chosen_numbers.clone(),
                price: draft.price,
                created_at: now,
                updated_at: now,
            };
            *next += 1;
            bets.push(bet.clone());
            created.push(bet);
        }
        Ok(created)
    }

    async fn find(&self, id: i64) -> Result<Option<Bet>, BetError> {
        Ok(self.bets.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn stale_bettors(&self, cutoff: DateTime<Utc>) -> Result<Vec<AuthUser>, BetError> {
        let bets = self.bets.lock().unwrap();
        let tokens = self.tokens.lock().unwrap();

        let mut latest: HashMap<i64, DateTime<Utc>> = HashMap::new();
        for bet in bets.iter() {
            let entry = latest.entry(bet.user_id).or_insert(bet.created_at);
            if bet.created_at > *entry {
                *entry = bet.created_at;
            }
        }

        let mut stale: Vec<AuthUser> = tokens
            .values()
            .filter(|u| latest.get(&u.id).is_some_and(|t| *t < cutoff))
            .cloned()
            .collect();
        stale.sort_by_key(|u| u.id);
        stale.dedup_by_key(|u| u.id);
        Ok(stale)
    }
}

#[async_trait]
impl SessionAuth for MockStore {
    async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, BetError> {
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }
}
