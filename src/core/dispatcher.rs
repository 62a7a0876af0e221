// src/core/dispatcher.rs

//! Routes parsed commands to service calls and translates every outcome into
//! reply text.
//!
//! Routing is two-mode on the session's authentication state: an anonymous
//! connection can only register, login or disconnect; everything else answers
//! with a fixed coaching message instead of an error. Handlers validate
//! argument arity before touching any service.
//!
//! Service calls run inline on the connection's task and are bounded by
//! construction (in-memory tables, append-sized file writes, hashing on the
//! blocking pool). A service call that blocked for long would stall that
//! connection's command loop, so nothing unbounded belongs here.

use crate::connection::ClientHandle;
use crate::core::CadenzaError;
use crate::core::protocol::{Command, CommandKind};
use crate::core::report::UNKNOWN_USER;
use crate::core::state::ServerState;
use std::sync::Arc;

pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command. Please enter valid command";
pub const LOGIN_REQUIRED_REPLY: &str = "You need to login or register to execute this command";
pub const NOT_AVAILABLE_LOGGED_IN_REPLY: &str =
    "This command is not available when you are logged in. You should disconnect first";
pub const REGISTER_OK_REPLY: &str = "The registration is successful";
pub const LOGIN_OK_REPLY: &str = "Login successful";
pub const DISCONNECT_OK_REPLY: &str = "Disconnect successful";
pub const STOP_OK_REPLY: &str = "Successfully stop streaming ";
pub const SEARCH_USAGE_REPLY: &str =
    "Less arguments than needed: expects at least one word. Example: search <words>";
pub const NO_SEARCH_RESULTS_REPLY: &str = "Cannot find the songs you are searching for";
pub const POSITIVE_NUMBER_REPLY: &str =
    "You should enter only positive number if you want top <number> songs. Example: \"top <3>\"";
pub const GENERIC_ERROR_REPLY: &str = "Unable to connect to the server. Try again later or \
     contact administrator by providing the logs in errors.txt";

/// The command dispatcher. Cheap to construct; holds only the shared state.
pub struct Dispatcher {
    state: Arc<ServerState>,
}

impl Dispatcher {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Routes one command for one connection and returns the reply text.
    /// Never fails: every outcome, including unexpected ones, becomes a
    /// user-facing string.
    pub async fn dispatch(&self, command: Command, client: &ClientHandle) -> String {
        if self.state.sessions.is_logged_in(client.id) {
            match command.kind {
                CommandKind::Disconnect => self.disconnect(&command.args, client).await,
                CommandKind::Search => self.search(&command.args).await,
                CommandKind::Top => self.top(&command.args, client).await,
                CommandKind::CreatePlaylist => self.create_playlist(&command.args, client).await,
                CommandKind::AddSongTo => self.add_song_to(&command.args, client).await,
                CommandKind::ShowPlaylist => self.show_playlist(&command.args, client).await,
                CommandKind::Play => self.play(&command.args, client).await,
                CommandKind::Stop => self.stop(&command.args),
                CommandKind::Unknown => UNKNOWN_COMMAND_REPLY.to_string(),
                _ => NOT_AVAILABLE_LOGGED_IN_REPLY.to_string(),
            }
        } else {
            match command.kind {
                CommandKind::Register => self.register(&command.args).await,
                CommandKind::Login => self.login(&command.args, client).await,
                CommandKind::Disconnect => self.disconnect(&command.args, client).await,
                CommandKind::Unknown => UNKNOWN_COMMAND_REPLY.to_string(),
                _ => LOGIN_REQUIRED_REPLY.to_string(),
            }
        }
    }

    async fn register(&self, args: &[String]) -> String {
        if args.len() != 2 {
            return usage(CommandKind::Register, 2, "register <email> <password>");
        }
        match self.state.users.register(&args[0], &args[1]).await {
            Ok(()) => REGISTER_OK_REPLY.to_string(),
            Err(e) => self.fail(&args[0], e).await,
        }
    }

    async fn login(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 2 {
            return usage(CommandKind::Login, 2, "login <email> <password>");
        }
        match self.state.users.login(&args[0], &args[1]).await {
            Ok(()) => {
                self.state.sessions.mark_logged_in(client.id, &args[0]);
                LOGIN_OK_REPLY.to_string()
            }
            Err(e) => self.fail(&args[0], e).await,
        }
    }

    /// Removes the session entry regardless of prior auth state and
    /// cooperatively stops a stream owned by the connection. Idempotent: a
    /// second disconnect yields the same success reply.
    async fn disconnect(&self, args: &[String], client: &ClientHandle) -> String {
        if !args.is_empty() {
            return usage(CommandKind::Disconnect, 0, "disconnect");
        }
        self.state.streaming.release_for(client.id);
        self.state.sessions.forget(client.id);
        DISCONNECT_OK_REPLY.to_string()
    }

    async fn search(&self, args: &[String]) -> String {
        if args.is_empty() {
            return SEARCH_USAGE_REPLY.to_string();
        }
        let songs = self.state.catalog.search(args);
        if songs.is_empty() {
            return NO_SEARCH_RESULTS_REPLY.to_string();
        }
        join_songs(&songs)
    }

    async fn top(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 1 {
            return usage(CommandKind::Top, 1, "top <number>");
        }
        let identity = self.identity_or_unknown(client);
        let number = match args[0].parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                self.state
                    .reporter
                    .report(&identity, &CadenzaError::NotPositiveNumber)
                    .await;
                return POSITIVE_NUMBER_REPLY.to_string();
            }
        };
        match self.state.catalog.top(number) {
            Ok(songs) => join_songs(&songs),
            Err(CadenzaError::NotPositiveNumber) => {
                self.state
                    .reporter
                    .report(&identity, &CadenzaError::NotPositiveNumber)
                    .await;
                POSITIVE_NUMBER_REPLY.to_string()
            }
            Err(e) => self.fail(&identity, e).await,
        }
    }

    async fn create_playlist(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 1 {
            return usage(
                CommandKind::CreatePlaylist,
                1,
                "create-playlist <name_of_the_playlist>",
            );
        }
        match self.state.catalog.create_playlist(&args[0]).await {
            Ok(()) => format!("Successful creation of the new playlist {}", args[0]),
            Err(e) => self.fail(&self.identity_or_unknown(client), e).await,
        }
    }

    async fn add_song_to(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 3 {
            return usage(
                CommandKind::AddSongTo,
                3,
                "add-song-to <name_of_the_playlist> <song name> <singer name>",
            );
        }
        match self
            .state
            .catalog
            .add_song_to(&args[0], &args[1], &args[2])
            .await
        {
            Ok(()) => format!(
                "Song {} has been successfully added to {}",
                args[1], args[0]
            ),
            Err(e) => self.fail(&self.identity_or_unknown(client), e).await,
        }
    }

    async fn show_playlist(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 1 {
            return usage(
                CommandKind::ShowPlaylist,
                1,
                "show-playlist <name_of_the_playlist>",
            );
        }
        match self.state.catalog.playlist_named(&args[0]) {
            Ok(playlist) => playlist.to_string(),
            Err(e) => self.fail(&self.identity_or_unknown(client), e).await,
        }
    }

    /// Starts a stream: resolve the song, claim the single stream slot,
    /// record the play, then hand the connection's write half to the stream
    /// task. The slot is returned untouched if recording the play fails.
    async fn play(&self, args: &[String], client: &ClientHandle) -> String {
        if args.len() != 2 {
            return usage(CommandKind::Play, 2, "play <song name> <singer name>");
        }
        let identity = self.identity_or_unknown(client);

        let song = match self.state.catalog.song(&args[0], &args[1]) {
            Ok(song) => song,
            Err(e) => return self.fail(&identity, e).await,
        };
        let ticket = match self.state.streaming.try_reserve(client.id, &song) {
            Ok(ticket) => ticket,
            Err(e) => return self.fail(&identity, e).await,
        };
        if let Err(e) = self.state.catalog.record_play(&song.name, &song.singer).await {
            self.state.streaming.release(ticket);
            return self.fail(&identity, e).await;
        }
        self.state
            .streaming
            .spawn(ticket, song, client.writer.clone());
        format!("Streaming: {} By {}", args[0], args[1])
    }

    /// Stops whatever stream occupies the slot. The reply races the last
    /// audio chunks on the same connection; the client treats receiving it as
    /// end-of-stream.
    fn stop(&self, args: &[String]) -> String {
        if !args.is_empty() {
            return usage(CommandKind::Stop, 0, "stop");
        }
        self.state.streaming.stop();
        STOP_OK_REPLY.to_string()
    }

    /// Reports the failure keyed by the given identity, then picks the reply:
    /// domain failures surface their own message, anything unexpected becomes
    /// the one generic reply.
    async fn fail(&self, identity: &str, failure: CadenzaError) -> String {
        self.state.reporter.report(identity, &failure).await;
        match failure {
            CadenzaError::UserAlreadyExists(_)
            | CadenzaError::WeakPassword
            | CadenzaError::UserNotFound(_)
            | CadenzaError::WrongPassword
            | CadenzaError::SongNotFound { .. }
            | CadenzaError::PlaylistNotFound(_)
            | CadenzaError::PlaylistAlreadyExists
            | CadenzaError::SongAlreadyInPlaylist { .. }
            | CadenzaError::StreamBusy => failure.to_string(),
            _ => GENERIC_ERROR_REPLY.to_string(),
        }
    }

    fn identity_or_unknown(&self, client: &ClientHandle) -> String {
        self.state
            .sessions
            .identity_of(client.id)
            .unwrap_or_else(|_| UNKNOWN_USER.to_string())
    }
}

fn usage(kind: CommandKind, expected: usize, example: &str) -> String {
    format!(
        "Not valid count of arguments: \"{kind}\" expects {expected} arguments. Example: \"{example}\""
    )
}

fn join_songs(songs: &[crate::core::catalog::Song]) -> String {
    songs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
