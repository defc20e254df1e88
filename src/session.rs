use crate::config::Config;
use crate::error::GameError;
use crate::game::game_phase::GamePhase;
use crate::game::player::{PlayerId, Role};
use crate::game::{Round, RoundSeq};
use crate::phase_timer::PhaseTimer;
use crate::player_registry::PlayerRegistry;
use crate::protocol::{AbortReason, Dispatch, Event, ServerMessage};
use crate::vote::cast_vote;
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, WeakUnboundedSender};

/// The whole mutable state of one game session. Only the owning `Session` touches it.
pub struct SessionState<R: PlayerRegistry> {
    pub registry: R,
    pub round: Option<Round>,
    next_seq: u64,
}

impl<R: PlayerRegistry> SessionState<R> {
    pub fn new(registry: R) -> SessionState<R> {
        SessionState {
            registry,
            round: None,
            next_seq: 1,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.round
            .as_ref()
            .map(|r| r.phase())
            .unwrap_or(GamePhase::Idle)
    }

    fn take_seq(&mut self) -> RoundSeq {
        let seq = RoundSeq(self.next_seq);
        self.next_seq += 1;
        seq
    }

    /// Round participants that are still connected, in snapshot order.
    fn connected_participants(&self, round: &Round) -> Vec<PlayerId> {
        round
            .participants()
            .iter()
            .copied()
            .filter(|&id| self.registry.contains(id))
            .collect()
    }
}

pub struct Session<R: PlayerRegistry> {
    config: Config,
    state: SessionState<R>,
    timers: PhaseTimer,
    // Timer callbacks post back into the session's own inbox. Weak, so the inbox closes
    // once every outside sender is gone.
    events: WeakUnboundedSender<Event>,
    outbox: UnboundedSender<Dispatch>,
    rng: StdRng,
}

impl<R: PlayerRegistry> Session<R> {
    pub fn new(
        config: Config,
        registry: R,
        events: UnboundedSender<Event>,
        outbox: UnboundedSender<Dispatch>,
    ) -> Session<R> {
        Session {
            config,
            state: SessionState::new(registry),
            timers: PhaseTimer::new(),
            events: events.downgrade(),
            outbox,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Session<R> {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> &SessionState<R> {
        &self.state
    }

    pub fn round(&self) -> Option<&Round> {
        self.state.round.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// Handles events one at a time until every sender is gone.
    pub async fn run(mut self, mut inbox: UnboundedReceiver<Event>) {
        info!(
            "Session running, waiting for {} players",
            self.config.minimum_players
        );
        while let Some(event) = inbox.recv().await {
            self.handle(event);
        }
        self.timers.cancel_all();
        info!("Session inbox closed");
    }

    pub fn handle(&mut self, event: Event) {
        let result = match event {
            Event::Connect(id) => self.connect(id).map_err(|e| (id, e)),
            Event::Disconnect(id) => {
                self.disconnect(id);
                Ok(())
            }
            Event::Vote { voter, accused } => self.vote(voter, accused).map_err(|e| (voter, e)),
            Event::Answer { player, option } => {
                debug!("Ignoring answer {:?} from {}", option, player);
                Ok(())
            }
            Event::Reset { player } => self.reset(player).map_err(|e| (player, e)),
            Event::PhaseElapsed { round, phase } => {
                self.phase_elapsed(round, phase);
                Ok(())
            }
        };

        if let Err((id, error)) = result {
            warn!("Rejected command from {}: {:?}", id, error);
            self.send(id, ServerMessage::Rejected { error });
        }
    }

    fn connect(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.state.registry.add(id)?;
        let connected = self.state.registry.count();
        info!("Player {} connected ({} connected)", id, connected);

        self.send(
            id,
            ServerMessage::Joined {
                connected,
                minimum: self.config.minimum_players,
            },
        );
        self.maybe_start_round();
        Ok(())
    }

    fn disconnect(&mut self, id: PlayerId) {
        if self.state.registry.remove(id).is_none() {
            debug!("Disconnect from unknown player {}", id);
            return;
        }
        info!("Player {} disconnected", id);

        let reason = match &self.state.round {
            Some(round) if round.is_participant(id) => {
                let remaining = self.state.connected_participants(round).len();
                if id == round.odd_participant() {
                    Some(AbortReason::OddParticipantLeft)
                } else if remaining < self.config.minimum_players {
                    Some(AbortReason::NotEnoughPlayers)
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(reason) = reason {
            self.abort(reason);
        }
    }

    fn vote(&mut self, voter: PlayerId, accused: PlayerId) -> Result<(), GameError> {
        let SessionState {
            registry, round, ..
        } = &mut self.state;
        let round = round.as_mut().ok_or(GameError::PhaseMismatch)?;

        let outcome = cast_vote(round, registry, voter, accused)?;
        info!("Player {} accused {}: {:?}", voter, accused, outcome);

        self.send(voter, ServerMessage::VoteResult { outcome });
        Ok(())
    }

    fn reset(&mut self, player: PlayerId) -> Result<(), GameError> {
        if !self.state.registry.contains(player) {
            debug!("Reset from unknown player {}", player);
            return Ok(());
        }

        let round = self.state.round.as_mut().ok_or(GameError::PhaseMismatch)?;
        if round.phase() != GamePhase::Voting {
            return Err(GameError::PhaseMismatch);
        }
        if !round.is_participant(player) {
            return Err(GameError::UnknownVoter);
        }
        round.advance_to(GamePhase::Resolved)?;
        info!("Round {} reset by {}", round.seq(), player);

        self.end_round(AbortReason::Reset);
        self.maybe_start_round();
        Ok(())
    }

    fn phase_elapsed(&mut self, seq: RoundSeq, phase: GamePhase) {
        let round = match self.state.round.as_mut() {
            Some(round) if round.seq() == seq => round,
            _ => {
                debug!("Stale timer for round {} ({})", seq, phase);
                return;
            }
        };

        if let Err(e) = round.advance_to(phase) {
            debug!(
                "Round {} cannot move from {} to {}: {:?}",
                seq,
                round.phase(),
                phase,
                e
            );
            return;
        }
        info!("Round {} is now {}", seq, phase);

        // Voting is only scheduled once the options are out, so the two can never arrive
        // out of order.
        let voting_in = self
            .config
            .voting_delay
            .saturating_sub(round.started_at().elapsed());

        let message = match phase {
            GamePhase::OptionsShown => ServerMessage::ShowOptions {
                options: self.config.answer_options.clone(),
            },
            GamePhase::Voting => ServerMessage::OpenVoting {
                participants: round.participants().to_vec(),
            },
            _ => return,
        };
        let recipients = match &self.state.round {
            Some(round) => self.state.connected_participants(round),
            None => return,
        };
        self.broadcast(&recipients, message);

        if phase == GamePhase::OptionsShown {
            self.schedule_phase(seq, GamePhase::Voting, voting_in);
        }
    }

    fn maybe_start_round(&mut self) {
        if self.state.round.is_some()
            || self.state.registry.count() < self.config.minimum_players
        {
            return;
        }

        let seq = self.state.take_seq();
        let shared = self
            .config
            .shared_prompts
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let divergent = self
            .config
            .divergent_prompts
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();

        let mut round = match Round::assign(
            seq,
            self.state.registry.ids(),
            shared,
            divergent,
            self.config.minimum_players,
            &mut self.rng,
        ) {
            Ok(round) => round,
            Err(e) => {
                warn!("Could not start round {}: {:?}", seq, e);
                return;
            }
        };
        info!(
            "Starting round {} with {} players",
            seq,
            round.participants().len()
        );

        self.state.registry.clear_round_state();
        for &id in round.participants() {
            let role = round.role_of(id).unwrap_or(Role::Unassigned);
            self.state.registry.set_role(id, role);
        }

        for (id, prompt) in round.prompts() {
            self.send(
                id,
                ServerMessage::AssignPrompt {
                    prompt: prompt.to_string(),
                },
            );
        }
        if let Err(e) = round.advance_to(GamePhase::PromptSent) {
            warn!("Round {} failed to send prompts: {:?}", seq, e);
            return;
        }

        self.schedule_phase(seq, GamePhase::OptionsShown, self.config.options_delay);
        self.state.round = Some(round);
    }

    fn schedule_phase(&mut self, seq: RoundSeq, phase: GamePhase, delay: Duration) {
        let events = self.events.clone();
        self.timers.schedule(delay, move || match events.upgrade() {
            Some(events) => {
                let _ = events.send(Event::PhaseElapsed { round: seq, phase });
            }
            None => debug!("Session gone before round {} reached {}", seq, phase),
        });
    }

    fn abort(&mut self, reason: AbortReason) {
        if let Some(round) = &self.state.round {
            info!("Aborting round {}: {}", round.seq(), reason);
        }
        self.end_round(reason);
    }

    /// Drops the current round and tells whoever is left.
    fn end_round(&mut self, reason: AbortReason) {
        self.timers.cancel_all();
        let round = match self.state.round.take() {
            Some(round) => round,
            None => return,
        };
        self.state.registry.clear_round_state();

        let recipients = self.state.connected_participants(&round);
        self.broadcast(&recipients, ServerMessage::RoundAborted { reason });
    }

    fn broadcast(&self, recipients: &[PlayerId], message: ServerMessage) {
        for &id in recipients {
            self.send(id, message.clone());
        }
    }

    fn send(&self, to: PlayerId, message: ServerMessage) {
        if self.outbox.send(Dispatch { to, message }).is_err() {
            warn!("Outbox closed, dropping message for {}", to);
        }
    }
}
