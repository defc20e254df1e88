use crate::game::player::PlayerId;
use crate::protocol::{Dispatch, Event, ServerMessage};
use log::{debug, info, warn};
use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::command::BotCommands,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type EventSender = UnboundedSender<Event>;

const VOTE_PREFIX: &str = "vote:";
pub const ANSWER_PREFIX: &str = "answer:";
/// Telegram rejects inline buttons whose callback data is longer than this, in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

/*
The chat id doubles as the connection handle. /join and /leave stand in for
connect and disconnect, everything else is forwarded to the session as is.
 */

pub fn get_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Odd One Out commands")]
pub enum Command {
    #[command(description = "shows this message.")]
    Help,
    #[command(description = "join the game")]
    Join,
    #[command(description = "leave the game")]
    Leave,
    #[command(description = "accuse a player by id")]
    Vote { id: i64 },
    #[command(description = "pick an answer option")]
    Answer { option: String },
    #[command(description = "end the voting and start a new round")]
    Reset,
}

async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    events: EventSender,
) -> Result<(), teloxide::RequestError> {
    let player = PlayerId(msg.chat.id.0);
    let event = match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
            return Ok(());
        }
        Command::Join => Event::Connect(player),
        Command::Leave => {
            bot.send_message(msg.chat.id, "You left the game").await?;
            Event::Disconnect(player)
        }
        Command::Vote { id } => Event::Vote {
            voter: player,
            accused: PlayerId(id),
        },
        Command::Answer { option } => Event::Answer { player, option },
        Command::Reset => Event::Reset { player },
    };

    forward(&events, event);
    Ok(())
}

async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    events: EventSender,
) -> Result<(), teloxide::RequestError> {
    bot.answer_callback_query(q.id.clone()).await?;

    let chat_id = match q.message.as_ref() {
        Some(message) => message.chat.id,
        None => return Ok(()),
    };
    let data = q.data.unwrap_or_default();

    match parse_callback(PlayerId(chat_id.0), &data) {
        Some(event) => forward(&events, event),
        None => debug!("Unrecognised callback data {:?} from {}", data, chat_id),
    }
    Ok(())
}

fn forward(events: &EventSender, event: Event) {
    if events.send(event).is_err() {
        warn!("Session is gone, dropping inbound event");
    }
}

/// Maps inline keyboard callback data back onto the command it stands for.
pub fn parse_callback(player: PlayerId, data: &str) -> Option<Event> {
    if let Some(id) = data.strip_prefix(VOTE_PREFIX) {
        let accused = id.parse().ok().map(PlayerId)?;
        Some(Event::Vote {
            voter: player,
            accused,
        })
    } else {
        data.strip_prefix(ANSWER_PREFIX).map(|option| Event::Answer {
            player,
            option: option.to_string(),
        })
    }
}

pub fn render(message: &ServerMessage) -> (String, Option<InlineKeyboardMarkup>) {
    match message {
        ServerMessage::Joined { connected, minimum } if connected < minimum => (
            format!("Joined! Waiting for players ({}/{})", connected, minimum),
            None,
        ),
        ServerMessage::Joined { connected, .. } => (
            format!("Joined! {} players connected", connected),
            None,
        ),
        ServerMessage::AssignPrompt { prompt } => (
            format!("Your word:\n{}\n\nAnswer options when prompted", prompt),
            None,
        ),
        ServerMessage::ShowOptions { options } => {
            let keyboard = options
                .iter()
                .map(|o| {
                    vec![InlineKeyboardButton::callback(
                        o.clone(),
                        format!("{}{}", ANSWER_PREFIX, o),
                    )]
                })
                .collect::<Vec<_>>();
            (String::from("Choose"), Some(InlineKeyboardMarkup::new(keyboard)))
        }
        ServerMessage::OpenVoting { participants } => {
            let keyboard = participants
                .iter()
                .map(|p| {
                    vec![InlineKeyboardButton::callback(
                        p.to_string(),
                        format!("{}{}", VOTE_PREFIX, p),
                    )]
                })
                .collect::<Vec<_>>();
            (
                String::from("Who is the mafia?"),
                Some(InlineKeyboardMarkup::new(keyboard)),
            )
        }
        ServerMessage::VoteResult { outcome } => (outcome.to_string(), None),
        ServerMessage::RoundAborted { reason } => (format!("Round aborted: {}", reason), None),
        ServerMessage::Rejected { error } => (error.to_string(), None),
    }
}

/// Drains the session's outbox into Telegram, one message at a time so each player sees
/// them in the order the session produced them.
pub async fn deliver(bot: Bot, mut outbox: UnboundedReceiver<Dispatch>) {
    while let Some(Dispatch { to, message }) = outbox.recv().await {
        let (text, keyboard) = render(&message);
        let mut request = bot.send_message(ChatId(to.0), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        if let Err(e) = request.await {
            warn!("Failed to deliver message to {}: {}", to, e);
        }
    }
    info!("Outbox closed, delivery stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::game::game_phase::VoteOutcome;

    #[test]
    fn callback_data_maps_to_events() {
        let me = PlayerId(7);

        assert_eq!(
            parse_callback(me, "vote:12"),
            Some(Event::Vote {
                voter: me,
                accused: PlayerId(12)
            })
        );
        assert_eq!(
            parse_callback(me, "answer:Option B"),
            Some(Event::Answer {
                player: me,
                option: "Option B".to_string()
            })
        );
        assert_eq!(parse_callback(me, "vote:abc"), None);
        assert_eq!(parse_callback(me, "something"), None);
    }

    #[test]
    fn voting_renders_a_button_per_participant() {
        let (text, keyboard) = render(&ServerMessage::OpenVoting {
            participants: vec![PlayerId(1), PlayerId(2), PlayerId(3)],
        });

        assert_eq!(text, "Who is the mafia?");
        assert_eq!(keyboard.unwrap().inline_keyboard.len(), 3);
    }

    #[test]
    fn private_messages_render_as_plain_text() {
        let (text, keyboard) = render(&ServerMessage::VoteResult {
            outcome: VoteOutcome::Correct,
        });
        assert_eq!(text, "Correct! You found the mafia 👀");
        assert!(keyboard.is_none());

        let (text, _) = render(&ServerMessage::Rejected {
            error: GameError::AlreadyVoted,
        });
        assert_eq!(text, "You have already voted this round");

        let (text, _) = render(&ServerMessage::Joined {
            connected: 2,
            minimum: 4,
        });
        assert_eq!(text, "Joined! Waiting for players (2/4)");
    }
}
