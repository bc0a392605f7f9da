use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::domain::{BattingStats, NewPlayer, Player, PlayerId, PlayerSort};
use super::repository::{PlayerRepository, RepositoryError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    position TEXT,
    games INTEGER NOT NULL DEFAULT 0,
    at_bat INTEGER NOT NULL DEFAULT 0,
    runs INTEGER NOT NULL DEFAULT 0,
    hits INTEGER NOT NULL DEFAULT 0,
    double_2b INTEGER NOT NULL DEFAULT 0,
    third_baseman INTEGER NOT NULL DEFAULT 0,
    home_runs INTEGER NOT NULL DEFAULT 0,
    rbi INTEGER NOT NULL DEFAULT 0,
    walks INTEGER NOT NULL DEFAULT 0,
    strikeouts INTEGER NOT NULL DEFAULT 0,
    stolen_bases INTEGER NOT NULL DEFAULT 0,
    caught_stealing INTEGER NOT NULL DEFAULT 0,
    batting_average REAL,
    on_base_percentage REAL,
    slugging_percentage REAL,
    on_base_plus_slugging REAL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const SELECT_PLAYER: &str = "SELECT id, name, position, games, at_bat, runs, hits, double_2b, \
    third_baseman, home_runs, rbi, walks, strikeouts, stolen_bases, caught_stealing, \
    batting_average, on_base_percentage, slugging_percentage, on_base_plus_slugging, \
    description, created_at, updated_at FROM players";

const INSERT_PLAYER: &str = "INSERT INTO players (name, position, games, at_bat, runs, hits, \
    double_2b, third_baseman, home_runs, rbi, walks, strikeouts, stolen_bases, caught_stealing, \
    batting_average, on_base_percentage, slugging_percentage, on_base_plus_slugging, \
    created_at, updated_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)";

const UPDATE_PLAYER: &str = "UPDATE players SET name = ?1, position = ?2, games = ?3, \
    at_bat = ?4, runs = ?5, hits = ?6, double_2b = ?7, third_baseman = ?8, home_runs = ?9, \
    rbi = ?10, walks = ?11, strikeouts = ?12, stolen_bases = ?13, caught_stealing = ?14, \
    batting_average = ?15, on_base_percentage = ?16, slugging_percentage = ?17, \
    on_base_plus_slugging = ?18, description = ?19, updated_at = ?20 WHERE id = ?21";

/// SQLite-backed player table. The connection is shared behind a mutex; every
/// call holds the lock only for its own statements.
pub struct SqlitePlayerRepository {
    connection: Mutex<Connection>,
}

impl SqlitePlayerRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let connection = Connection::open(path)?;
        Self::with_connection(connection)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let connection = Connection::open_in_memory()?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, RepositoryError> {
        connection.execute(SCHEMA, [])?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for SqlitePlayerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePlayerRepository").finish_non_exhaustive()
    }
}

impl PlayerRepository for SqlitePlayerRepository {
    fn list(&self, sort: PlayerSort) -> Result<Vec<Player>, RepositoryError> {
        let connection = self.connection()?;
        // Both fragments come from fixed enum tables, never from request text.
        let sql = format!(
            "{SELECT_PLAYER} ORDER BY {} {}, id ASC",
            sort.key.column(),
            sort.order.keyword()
        );
        let mut statement = connection.prepare(&sql)?;
        let players = statement
            .query_map([], player_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }

    fn fetch(&self, id: PlayerId) -> Result<Option<Player>, RepositoryError> {
        let connection = self.connection()?;
        let mut statement = connection.prepare(&format!("{SELECT_PLAYER} WHERE id = ?1"))?;
        let mut rows = statement.query_map(params![id.0], player_from_row)?;
        let player = rows.next().transpose()?;
        Ok(player)
    }

    fn update(&self, player: Player) -> Result<(), RepositoryError> {
        let connection = self.connection()?;
        let stats = &player.stats;
        let changed = connection.execute(
            UPDATE_PLAYER,
            params![
                player.name,
                player.position,
                stats.games,
                stats.at_bat,
                stats.runs,
                stats.hits,
                stats.double_2b,
                stats.third_baseman,
                stats.home_runs,
                stats.rbi,
                stats.walks,
                stats.strikeouts,
                stats.stolen_bases,
                stats.caught_stealing,
                stats.batting_average,
                stats.on_base_percentage,
                stats.slugging_percentage,
                stats.on_base_plus_slugging,
                player.description,
                player.updated_at,
                player.id.0,
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn replace_all(
        &self,
        players: Vec<NewPlayer>,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut connection = self.connection()?;
        let transaction = connection.transaction()?;
        let removed = transaction.execute("DELETE FROM players", [])?;

        {
            let mut insert = transaction.prepare(INSERT_PLAYER)?;
            for player in &players {
                let stats = &player.stats;
                insert.execute(params![
                    player.name,
                    player.position,
                    stats.games,
                    stats.at_bat,
                    stats.runs,
                    stats.hits,
                    stats.double_2b,
                    stats.third_baseman,
                    stats.home_runs,
                    stats.rbi,
                    stats.walks,
                    stats.strikeouts,
                    stats.stolen_bases,
                    stats.caught_stealing,
                    stats.batting_average,
                    stats.on_base_percentage,
                    stats.slugging_percentage,
                    stats.on_base_plus_slugging,
                    now,
                    now,
                ])?;
            }
        }

        transaction.commit()?;
        debug!(removed, inserted = players.len(), "replaced player table");
        Ok(players.len())
    }
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: PlayerId(row.get(0)?),
        name: row.get(1)?,
        position: row.get(2)?,
        stats: BattingStats {
            games: row.get(3)?,
            at_bat: row.get(4)?,
            runs: row.get(5)?,
            hits: row.get(6)?,
            double_2b: row.get(7)?,
            third_baseman: row.get(8)?,
            home_runs: row.get(9)?,
            rbi: row.get(10)?,
            walks: row.get(11)?,
            strikeouts: row.get(12)?,
            stolen_bases: row.get(13)?,
            caught_stealing: row.get(14)?,
            batting_average: row.get(15)?,
            on_base_percentage: row.get(16)?,
            slugging_percentage: row.get(17)?,
            on_base_plus_slugging: row.get(18)?,
        },
        description: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}
