// src/bin/lobby_dev_cli.rs

use nexus_casino::api::{
    ApiError, BlackjackCommand, Command, CommandResponse, CreateRoomCommand, Query, QueryResponse,
    RoomCommand,
};
use nexus_casino::config::LobbyConfig;
use nexus_casino::domain::{Coins, GameKind, Identity, Room, RoomId};
use nexus_casino::engine::autoplay::choose_action;
use nexus_casino::engine::RandomSource;
use nexus_casino::infra::{DeterministicRng, SystemRng};
use nexus_casino::ledger::Ledger;
use nexus_casino::orchestrator::LobbyService;
use tracing_subscriber::EnvFilter;

/// Защита от зацикливания симуляции.
const MAX_STEPS: usize = 500;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("lobby_dev_cli: стартуем dev-CLI лобби…");

    // Путь к JSON-конфигу можно передать первым аргументом.
    let config = match std::env::args().nth(1) {
        Some(path) => match LobbyConfig::load(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                println!("[CLI] Не удалось загрузить конфиг: {err}");
                return;
            }
        },
        None => LobbyConfig::default(),
    };

    let result = match config.rng_seed {
        Some(seed) => run(config, DeterministicRng::from_seed(seed)),
        None => run(config, SystemRng),
    };

    if let Err(err) = result {
        println!("[CLI] Ошибка: {err:?}");
    }
    println!("[CLI] Завершение работы dev-CLI.");
}

fn run<R: RandomSource>(config: LobbyConfig, rng: R) -> Result<(), ApiError> {
    let mut service = LobbyService::new(Ledger::from_config(config), rng);

    service.subscribe(Box::new(|rooms: &[Room]| {
        println!("[FEED] комнат в лобби: {}", rooms.len());
    }))?;

    for (id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        service.execute(
            id,
            Command::SignIn(Identity {
                user_id: id.to_string(),
                display_name: Some(name.to_string()),
                photo_url: None,
            }),
        )?;
    }

    println!();
    println!("================ DOMINOES ROOM =================");

    let room_id = match service.execute(
        "alice",
        Command::CreateRoom(CreateRoomCommand {
            game_kind: GameKind::Dominoes,
            capacity: 2,
            wager: Coins::new(100),
        }),
    )? {
        CommandResponse::Room(view) => view.room_id,
        other => return Err(ApiError::Internal(format!("неожиданный ответ: {other:?}"))),
    };
    println!("[CLI] alice создала комнату {room_id}");

    service.execute(
        "bob",
        Command::RoomCommand(RoomCommand::Join {
            room_id: room_id.clone(),
            as_spectator: false,
        }),
    )?;
    println!("[CLI] bob сел за стол, матч стартовал");

    play_out(&mut service, &room_id)?;

    for id in ["alice", "bob"] {
        if let QueryResponse::User(Some(user)) = service.query(Query::GetUser {
            user_id: id.to_string(),
        })? {
            println!("[CLI] {} баланс: {}", user.name, user.coins);
        }
    }

    println!();
    println!("================ PRACTICE ROOM =================");

    if let CommandResponse::Room(view) = service.execute(
        "alice",
        Command::CreatePracticeRoom {
            game_kind: GameKind::Dominoes,
            capacity: 3,
        },
    )? {
        let names: Vec<&str> = view.players.iter().map(|p| p.name.as_str()).collect();
        println!("[CLI] тренировка {}: {:?}", view.room_id, names);
        play_out(&mut service, &view.room_id)?;
    }

    println!();
    println!("================ BLACKJACK =================");

    service.execute("bob", Command::Blackjack(BlackjackCommand::Deal))?;
    if let CommandResponse::Blackjack(view) =
        service.execute("bob", Command::Blackjack(BlackjackCommand::Stand))?
    {
        println!(
            "[CLI] игрок {} против дилера {}: {:?}",
            view.player_score, view.dealer_score, view.outcome
        );
    }

    Ok(())
}

/// Доиграть матч: за каждого человека ходит та же стратегия, что и у ботов.
fn play_out<R: RandomSource>(service: &mut LobbyService<R>, room_id: &RoomId) -> Result<(), ApiError> {
    for _ in 0..MAX_STEPS {
        let (actor, action) = match service.matches().get(room_id) {
            Some(engine) if !engine.is_finished() => (
                engine.current_player().clone(),
                choose_action(engine, engine.turn),
            ),
            _ => {
                println!("[CLI] матч в {room_id} уже завершён");
                return Ok(());
            }
        };

        let response = service.execute(
            &actor,
            Command::RoomCommand(RoomCommand::Play {
                room_id: room_id.clone(),
                action,
            }),
        )?;

        match response {
            CommandResponse::Match { view, .. } => {
                println!(
                    "[CLI] {actor}: {action:?} | на столе {} | базар {}",
                    view.board.len(),
                    view.boneyard_left
                );
            }
            CommandResponse::MatchFinished {
                summary, payout, ..
            } => {
                println!(
                    "[CLI] победил {} ({:?}), выплата {}",
                    summary.winner, summary.reason, payout
                );
                return Ok(());
            }
            other => println!("[CLI] неожиданный ответ: {other:?}"),
        }
    }

    println!("[CLI] Превышен лимит шагов ({MAX_STEPS}), выходим.");
    Ok(())
}
