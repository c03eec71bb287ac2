use std::time::Duration;

use packet_rush_core::{
    Command, Direction, Event, JunctionId, LevelMode, PacketKind, Phase, Position, Timer, Tuning,
};
use packet_rush_world::{self as world, query, Grid, Junction, Level, World};

const FORK: [&str; 5] = [
    "#######", //
    "#S-+-G#", //
    "#  |  #", //
    "#  O  #", //
    "#######",
];

fn level(rows: &[&str], junctions: Vec<Junction>, mode: LevelMode) -> Level {
    Level {
        number: 1,
        grid: Grid::from_rows(rows.iter().copied()),
        junctions,
        spawn_interval: Duration::from_secs(4),
        goal: "Deliver the letters".to_owned(),
        mode,
    }
}

fn spelling(word: &str) -> LevelMode {
    LevelMode::Spelling {
        word: word.to_owned(),
    }
}

fn fork_junction() -> Junction {
    Junction::new(
        JunctionId::new('1'),
        Position::new(3, 1),
        vec![Direction::Right, Direction::Down],
    )
}

fn fork_world(tuning: Tuning) -> World {
    World::new(level(&FORK, vec![fork_junction()], spelling("GO")), tuning)
}

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn spawn(world: &mut World, letter: char) -> Vec<Event> {
    submit(
        world,
        Command::SpawnPacket {
            kind: PacketKind::Letter(letter),
        },
    )
}

fn tick(world: &mut World, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        world::apply(world, Command::MovementTick, &mut events);
    }
    events
}

fn switch(world: &mut World, key: char) -> Vec<Event> {
    submit(
        world,
        Command::SwitchJunction {
            id: JunctionId::new(key),
        },
    )
}

fn packet_cells(world: &World) -> Vec<(Position, Direction)> {
    query::packet_view(world)
        .iter()
        .map(|packet| (packet.cell, packet.direction))
        .collect()
}

#[test]
fn due_spawn_tick_places_one_packet_at_spawn_heading_right() {
    let mut world = World::new(
        level(
            &[
                "##########",
                "#        #",
                "#        #",
                "#        #",
                "#S----G--#",
                "##########",
            ],
            Vec::new(),
            spelling("GO"),
        ),
        Tuning::default(),
    );

    let events = submit(
        &mut world,
        Command::SpawnTick {
            elapsed: Duration::from_secs(4),
        },
    );
    let kinds = events
        .iter()
        .find_map(|event| match event {
            Event::SpawnDue { kinds } => Some(kinds.clone()),
            _ => None,
        })
        .expect("spawn should be due");
    assert_eq!(kinds, vec![PacketKind::Letter('G'), PacketKind::Letter('O')]);

    let _ = submit(&mut world, Command::SpawnPacket { kind: kinds[0] });

    assert_eq!(
        packet_cells(&world),
        vec![(Position::new(1, 4), Direction::Right)]
    );
}

#[test]
fn spawn_tick_accumulates_elapsed_time_until_due() {
    let mut world = fork_world(Tuning::default());

    let early = submit(
        &mut world,
        Command::SpawnTick {
            elapsed: Duration::from_secs(1),
        },
    );
    assert_eq!(
        early,
        vec![Event::TimerRequested {
            timer: Timer::Spawn,
            delay: Duration::from_secs(4),
        }]
    );

    let due = submit(
        &mut world,
        Command::SpawnTick {
            elapsed: Duration::from_secs(3),
        },
    );
    assert!(matches!(due.first(), Some(Event::SpawnDue { .. })));
    assert_eq!(
        due.last(),
        Some(&Event::TimerRequested {
            timer: Timer::Spawn,
            delay: Duration::from_millis(3_950),
        })
    );
}

#[test]
fn packet_entering_junction_takes_active_route() {
    let mut world = fork_world(Tuning::default());
    let _ = spawn(&mut world, 'G');
    let _ = switch(&mut world, '1');

    let _ = tick(&mut world, 2);

    assert_eq!(
        packet_cells(&world),
        vec![(Position::new(3, 1), Direction::Down)]
    );
}

#[test]
fn switching_after_a_packet_passed_does_not_redirect_it() {
    let mut world = fork_world(Tuning::default());
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 3);
    assert_eq!(
        packet_cells(&world),
        vec![(Position::new(4, 1), Direction::Right)]
    );

    let switched = switch(&mut world, '1');
    assert_eq!(
        switched,
        vec![Event::JunctionSwitched {
            id: JunctionId::new('1'),
            direction: Direction::Down,
        }]
    );

    let events = tick(&mut world, 1);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PacketDelivered { reward: 10, .. })));
    assert_eq!(query::progress(&world), &['G']);
}

#[test]
fn spelling_the_word_completes_the_level_with_bonus() {
    let tuning = Tuning::default();
    let mut world = fork_world(tuning.clone()).with_score(7);

    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 4);
    assert_eq!(query::progress(&world), &['G']);
    assert_eq!(query::phase(&world), Phase::Playing);

    let _ = switch(&mut world, '1');
    let _ = spawn(&mut world, 'O');
    let events = tick(&mut world, 4);

    assert_eq!(query::progress(&world), &['G', 'O']);
    assert_eq!(query::phase(&world), Phase::LevelComplete);
    assert_eq!(
        query::score(&world),
        7 + tuning.delivery_reward * 2 + tuning.level_complete_bonus
    );
    assert_eq!(
        events.last(),
        Some(&Event::LevelCompleted {
            level: 1,
            bonus: tuning.level_complete_bonus,
        })
    );
}

#[test]
fn misroute_on_last_life_ends_the_game_and_freezes_packets() {
    let tuning = Tuning {
        lives: 1,
        ..Tuning::default()
    };
    let mut world = fork_world(tuning);
    let _ = switch(&mut world, '1');
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 1);
    let _ = spawn(&mut world, 'O');

    let events = tick(&mut world, 3);

    assert_eq!(query::lives(&world), 0);
    assert_eq!(query::phase(&world), Phase::GameOver);
    assert!(query::progress(&world).is_empty());
    assert_eq!(events.last(), Some(&Event::GameOver { score: 0 }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PacketMisrouted { kind: PacketKind::Letter('G'), .. })));

    let frozen = packet_cells(&world);
    assert_eq!(frozen, vec![(Position::new(3, 2), Direction::Down)]);

    let later = tick(&mut world, 5);
    assert!(later.is_empty());
    assert_eq!(packet_cells(&world), frozen);
    assert!(spawn(&mut world, 'G').is_empty());
}

#[test]
fn mismatched_destination_costs_exactly_one_life() {
    let mut world = fork_world(Tuning::default());
    let _ = switch(&mut world, '1');
    let _ = spawn(&mut world, 'G');

    let _ = tick(&mut world, 4);

    assert_eq!(query::lives(&world), 2);
    assert_eq!(query::score(&world), 0);
    assert!(query::progress(&world).is_empty());
    assert!(query::packet_view(&world).is_empty());
}

#[test]
fn packet_hitting_a_wall_is_lost() {
    let mut world = World::new(
        level(&["#####", "#S--#", "#####"], Vec::new(), spelling("GO")),
        Tuning::default(),
    );
    let _ = spawn(&mut world, 'G');

    let events = tick(&mut world, 3);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PacketLost { .. })));
    assert_eq!(query::lives(&world), 2);
    assert_eq!(query::streak(&world), 0);
    assert!(query::packet_view(&world).is_empty());
}

#[test]
fn packet_leaving_the_grid_is_lost() {
    let mut world = World::new(
        level(&["S--"], Vec::new(), spelling("GO")),
        Tuning::default(),
    );
    let _ = spawn(&mut world, 'O');

    let _ = tick(&mut world, 3);

    assert_eq!(query::lives(&world), 2);
    assert!(query::packet_view(&world).is_empty());
}

#[test]
fn junction_without_routes_halts_entering_packets() {
    let junction = Junction::new(JunctionId::new('1'), Position::new(3, 1), Vec::new());
    let mut world = World::new(level(&FORK, vec![junction], spelling("GO")), Tuning::default());
    let _ = spawn(&mut world, 'G');

    let _ = tick(&mut world, 6);

    assert_eq!(
        packet_cells(&world),
        vec![(Position::new(3, 1), Direction::Halted)]
    );
    assert_eq!(query::lives(&world), 3);
}

#[test]
fn unknown_junction_is_ignored() {
    let mut world = fork_world(Tuning::default());

    assert!(switch(&mut world, 'z').is_empty());
    assert_eq!(
        query::junction_view(&world)
            .at(Position::new(3, 1))
            .map(|junction| junction.direction),
        Some(Direction::Right)
    );
}

#[test]
fn pausing_twice_restores_the_original_state() {
    let mut world = fork_world(Tuning::default());
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 1);
    let before = packet_cells(&world);

    let paused = submit(&mut world, Command::TogglePause);
    assert_eq!(paused, vec![Event::PauseToggled { paused: true }]);
    assert_eq!(query::phase(&world), Phase::Paused);
    assert!(tick(&mut world, 2).is_empty());
    assert_eq!(switch(&mut world, '1').len(), 1);
    let _ = switch(&mut world, '1');

    let resumed = submit(&mut world, Command::TogglePause);
    assert_eq!(
        resumed,
        vec![
            Event::PauseToggled { paused: false },
            Event::TimerRequested {
                timer: Timer::Movement,
                delay: Duration::from_millis(199),
            },
            Event::TimerRequested {
                timer: Timer::Spawn,
                delay: Duration::from_secs(4),
            },
        ]
    );
    assert_eq!(query::phase(&world), Phase::Playing);
    assert_eq!(query::ticks(&world), 1);
    assert_eq!(packet_cells(&world), before);
}

#[test]
fn identical_inputs_produce_identical_ticks() {
    fn run() -> (Vec<Event>, Vec<(Position, Direction)>) {
        let mut world = fork_world(Tuning::default());
        let mut log = Vec::new();
        log.extend(spawn(&mut world, 'O'));
        log.extend(tick(&mut world, 1));
        log.extend(switch(&mut world, '1'));
        log.extend(spawn(&mut world, 'G'));
        log.extend(tick(&mut world, 2));
        (log, packet_cells(&world))
    }

    assert_eq!(run(), run());
}

#[test]
fn intervals_decay_monotonically_to_their_floors() {
    let tuning = Tuning {
        movement_interval_ms: 80,
        movement_floor_ms: 50,
        movement_decay_ms: 7,
        ..Tuning::default()
    };
    let mut world = fork_world(tuning);

    let mut previous = Duration::MAX;
    for _ in 0..20 {
        let _ = tick(&mut world, 1);
        let interval = query::movement_interval(&world);
        assert!(interval <= previous);
        assert!(interval >= Duration::from_millis(50));
        previous = interval;
    }
    assert_eq!(previous, Duration::from_millis(50));

    let mut previous = query::spawn_interval(&world);
    for _ in 0..200 {
        let _ = submit(
            &mut world,
            Command::SpawnTick {
                elapsed: Duration::from_secs(5),
            },
        );
        let interval = query::spawn_interval(&world);
        assert!(interval <= previous);
        assert!(interval >= Duration::from_millis(300));
        previous = interval;
    }
    assert_eq!(previous, Duration::from_millis(300));
}

#[test]
fn terminal_states_only_accept_their_escape_command() {
    let tuning = Tuning {
        lives: 1,
        ..Tuning::default()
    };
    let mut world = fork_world(tuning);
    let _ = switch(&mut world, '1');
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 4);
    assert_eq!(query::phase(&world), Phase::GameOver);

    assert!(switch(&mut world, '1').is_empty());
    assert!(submit(&mut world, Command::AdvanceLevel).is_empty());
    assert!(submit(&mut world, Command::Start).is_empty());
    assert_eq!(
        submit(&mut world, Command::TogglePause),
        vec![Event::PauseToggled { paused: true }]
    );
    assert_eq!(
        submit(&mut world, Command::TogglePause),
        vec![Event::PauseToggled { paused: false }]
    );
    assert_eq!(
        submit(&mut world, Command::Restart),
        vec![Event::RestartRequested]
    );
}

#[test]
fn completed_level_requests_advance_with_running_score() {
    let mut world = World::new(
        level(&["#####", "#S-G#", "#####"], Vec::new(), spelling("G")),
        Tuning::default(),
    );
    assert!(submit(&mut world, Command::AdvanceLevel).is_empty());
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 2);

    assert_eq!(query::phase(&world), Phase::LevelComplete);
    assert!(submit(&mut world, Command::Restart).is_empty());
    assert_eq!(
        submit(&mut world, Command::AdvanceLevel),
        vec![Event::LevelAdvanceRequested {
            level: 1,
            score: 110,
        }]
    );
    assert!(tick(&mut world, 3).is_empty());
    assert_eq!(query::progress(&world).len(), 1);
}

#[test]
fn spawn_cell_is_not_a_destination_but_other_s_cells_are() {
    let mut world = World::new(
        level(&["#####", "#S-S#", "#####"], Vec::new(), spelling("SO")),
        Tuning::default(),
    );
    let _ = spawn(&mut world, 'S');

    let events = tick(&mut world, 2);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PacketDelivered { .. })));
    assert_eq!(query::progress(&world), &['S']);
}

#[test]
fn numeric_ports_scale_rewards_with_streak_and_penalise_misses() {
    let mode = LevelMode::NumericPorts {
        ports: vec![1, 2],
        quota: 3,
    };
    let mut world = World::new(
        level(&["#####", "#S-1#", "#####"], Vec::new(), mode),
        Tuning::default(),
    );
    let port = |number| Command::SpawnPacket {
        kind: PacketKind::Port(number),
    };

    let _ = submit(&mut world, port(1));
    let _ = tick(&mut world, 1);
    let _ = submit(&mut world, port(1));
    let first = tick(&mut world, 1);
    let second = tick(&mut world, 1);

    assert!(first
        .iter()
        .any(|event| matches!(event, Event::PacketDelivered { reward: 10, .. })));
    assert!(second
        .iter()
        .any(|event| matches!(event, Event::PacketDelivered { reward: 15, .. })));
    assert_eq!(query::score(&world), 25);
    assert_eq!(query::streak(&world), 2);
    assert_eq!(query::progress(&world), &['1', '1']);

    let _ = submit(&mut world, port(2));
    let _ = tick(&mut world, 2);

    assert_eq!(query::score(&world), 20);
    assert_eq!(query::streak(&world), 0);
    assert_eq!(query::lives(&world), 2);
    assert_eq!(query::phase(&world), Phase::Playing);
}

#[test]
fn snapshot_exposes_hud_state() {
    let mut world = fork_world(Tuning::default());
    let _ = spawn(&mut world, 'G');
    let _ = tick(&mut world, 1);

    let snapshot = query::snapshot(&world);

    assert_eq!(snapshot.grid.spawn(), Some(Position::new(1, 1)));
    assert_eq!(snapshot.packets.len(), 1);
    assert_eq!(snapshot.junctions.iter().count(), 1);
    assert_eq!(snapshot.target, "GO");
    assert_eq!(snapshot.target_len, 2);
    assert_eq!(snapshot.lives, 3);
    assert_eq!(snapshot.ticks, 1);
    assert!(!snapshot.paused && !snapshot.game_over && !snapshot.level_complete);
    assert_eq!(query::welcome_banner(&world), "Welcome to Packet Rush.");
}
