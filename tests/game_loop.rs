/// Integration tests for the fixed-timestep loop
///
/// These drive a whole session through scripted input and check the
/// phase machine, scoring, rendering and telemetry the loop produces.
mod common;

use alien_invasion::{
    Direction, GameEvent, GameLoop, GamePhase, PerformanceMonitor, Settings, SpriteId,
    TerminalSurface,
};
use common::*;
use ratatui::{Terminal, backend::TestBackend};

fn shoot_down(game: &mut TestGame, index: usize) {
    // Line up under the target
    for _ in 0..400 {
        let target = game.fleet().aliens()[index].entity.bounds.center_x();
        let ship = game.player().entity.bounds.center_x();
        if (target - ship).abs() < 4.0 {
            break;
        }
        game.input_mut().hold(target < ship, target > ship, false);
        game.tick().unwrap();
    }

    game.input_mut().hold(false, false, true);
    game.tick().unwrap();
    game.input_mut().hold(false, false, false);

    for _ in 0..120 {
        if !game.fleet().aliens()[index].is_alive() {
            return;
        }
        game.tick().unwrap();
    }
    panic!("alien {index} survived");
}

#[test]
fn test_clearing_a_row_of_five() {
    let mut game = game_with(Settings {
        fleet_rows: 1,
        fleet_cols: 5,
        fleet_speed: 1.0,
        ..steady_settings()
    });

    for index in 0..5 {
        assert_eq!(game.phase(), GamePhase::Running);
        shoot_down(&mut game, index);
    }

    assert!(game.fleet().is_cleared());
    assert_eq!(game.session().score, 5 * 50);
    assert_eq!(game.phase(), GamePhase::LevelClear);

    let events = game.take_events();
    let destroyed = events
        .iter()
        .filter(|e| matches!(e, GameEvent::AlienDestroyed { .. }))
        .count();
    let shots = events.iter().filter(|e| **e == GameEvent::ShotFired).count();
    assert_eq!(destroyed, 5);
    assert_eq!(shots, 5);
    assert_eq!(events.last(), Some(&GameEvent::LevelCleared { level: 1 }));
    assert_eq!(game.player().lives_remaining, 3);
}

#[test]
fn test_last_life_goes_to_game_over() {
    let mut game = game_with(Settings {
        starting_lives: 1,
        ..steady_settings()
    });
    ram_player(&mut game, &[0]);
    game.tick().unwrap();

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(!game.player().is_alive());
    assert_eq!(game.session().lives, 0);
    assert_eq!(
        game.take_events(),
        vec![
            GameEvent::PlayerHit { lives_remaining: 0 },
            GameEvent::GameOver { score: 0 }
        ]
    );

    // Nothing moves once the game is over
    let before: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();
    ticks(&mut game, 10);
    let after: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();
    assert_eq!(before, after);
}

#[test]
fn test_pile_up_costs_one_life() {
    let mut game = game_with(steady_settings());
    ram_player(&mut game, &[0, 1, 2, 3]);
    game.tick().unwrap();

    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.player().lives_remaining, 2);
    assert_eq!(game.session().lives, 2);
    assert_eq!(game.session().score, 0);
    assert_eq!(game.fleet().alive_count(), 28);
    assert_eq!(
        game.take_events(),
        vec![GameEvent::PlayerHit { lives_remaining: 2 }]
    );
}

#[test]
fn test_hit_clears_bullets_and_respawns() {
    let mut game = game_with(steady_settings());
    game.input_mut().hold(true, false, true);
    ticks(&mut game, 20);
    assert!(game.pool().alive_count() > 0);
    assert_ne!(game.player().entity.bounds.x, game.player().spawn_point().0);

    game.input_mut().hold(false, false, false);
    ram_player(&mut game, &[5]);
    game.tick().unwrap();

    assert_eq!(game.pool().alive_count(), 0);
    assert_eq!(game.player().entity.bounds.x, game.player().spawn_point().0);
}

#[test]
fn test_left_edge_flip_then_drop() {
    let mut game = game_with(steady_settings());
    let fleet = game.fleet_mut();
    fleet.direction = Direction::Left;
    // Leftmost column half a unit from the margin; one tick moves one unit
    let shift = fleet.aliens()[0].entity.bounds.x - 0.5;
    for alien in fleet.aliens_mut() {
        alien.translate(-shift, 0.0);
    }
    let start: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();

    // Edge contact: nothing moves, direction flips
    game.tick().unwrap();
    assert_eq!(game.fleet().direction, Direction::Right);
    assert!(game.fleet().drop_pending);
    let contact: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();
    assert_eq!(contact, start);

    // Drop: straight down, x unchanged
    game.tick().unwrap();
    assert!(!game.fleet().drop_pending);
    assert_eq!(game.fleet().direction, Direction::Right);
    for (alien, before) in game.fleet().aliens().iter().zip(&start) {
        assert_eq!(alien.entity.bounds.x, before.x);
        assert_eq!(alien.entity.bounds.y, before.y + 10.0);
    }

    // Then sideways again, now to the right
    game.tick().unwrap();
    assert!(game.fleet().aliens()[0].entity.bounds.x > start[0].x);
}

#[test]
fn test_boundary_breach_ends_game_with_lives_left() {
    let mut game = game_with(steady_settings());
    let alien = &mut game.fleet_mut().aliens_mut()[0].entity.bounds;
    alien.x = 10.0;
    alien.y = 780.0;
    game.tick().unwrap();

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.session().lives, 3);
    assert!(game.player().is_alive());
}

#[test]
fn test_game_over_beats_level_clear() {
    let mut game = game_with(Settings {
        fleet_rows: 1,
        fleet_cols: 1,
        starting_lives: 1,
        ..steady_settings()
    });
    ram_player(&mut game, &[0]);
    game.tick().unwrap();

    assert!(game.fleet().is_cleared());
    assert_eq!(game.phase(), GamePhase::GameOver);
}

#[test]
fn test_non_fatal_hit_while_clearing() {
    let mut game = game_with(Settings {
        fleet_rows: 1,
        fleet_cols: 1,
        ..steady_settings()
    });
    ram_player(&mut game, &[0]);
    game.tick().unwrap();

    assert_eq!(game.phase(), GamePhase::LevelClear);
    assert_eq!(game.session().lives, 2);
    assert_eq!(game.session().score, 0);
}

#[test]
fn test_pause_is_idempotent_per_event() {
    let mut game = game_with(steady_settings());
    game.input_mut().press(|input| input.pause = true);
    game.tick().unwrap();
    assert_eq!(game.phase(), GamePhase::Paused);

    // Same snapshot polled again must not toggle back
    let frozen: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();
    ticks(&mut game, 5);
    assert_eq!(game.phase(), GamePhase::Paused);
    let still: Vec<_> = game.fleet().aliens().iter().map(|a| a.entity.bounds).collect();
    assert_eq!(frozen, still);
    assert_eq!(game.take_events(), vec![GameEvent::Paused]);

    game.input_mut().press(|input| input.pause = true);
    game.tick().unwrap();
    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.take_events(), vec![GameEvent::Resumed]);
}

#[test]
fn test_quit_finishes_the_tick() {
    let mut game = game_with(Settings {
        tick_rate: 64.0,
        ..steady_settings()
    });
    game.input_mut().hold(false, false, true);
    game.input_mut().press(|input| input.quit = true);

    // Time for three ticks, but quitting stops after the first
    let report = game.advance(3.0 / 64.0).unwrap();
    assert!(report.quit);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.events, vec![GameEvent::ShotFired]);
    assert_eq!(game.tick_count(), 1);
    assert_eq!(game.telemetry().samples.len(), 1);
    assert_eq!(game.renderer().frames.len(), 1);

    assert!(game.shutdown().is_ok());
}

#[test]
fn test_frame_jitter_does_not_change_the_simulation() {
    let settings = Settings {
        tick_rate: 64.0,
        ..Settings::default()
    };
    let mut steady = game_with(settings.clone());
    let mut jittery = game_with(settings);
    steady.input_mut().hold(false, true, true);
    jittery.input_mut().hold(false, true, true);

    for _ in 0..60 {
        steady.advance(1.0 / 64.0).unwrap();
    }
    // Same total time, uneven frames
    let pattern = [1.0 / 128.0, 3.0 / 128.0, 1.0 / 64.0, 0.0, 2.0 / 64.0];
    for _ in 0..12 {
        for frame in pattern {
            jittery.advance(frame).unwrap();
        }
    }

    assert_eq!(steady.tick_count(), 60);
    assert_eq!(jittery.tick_count(), 60);
    assert_eq!(steady.player().entity.bounds, jittery.player().entity.bounds);
    let bounds = |game: &TestGame| -> Vec<_> {
        game.fleet().aliens().iter().map(|a| a.entity.bounds).collect()
    };
    assert_eq!(bounds(&steady), bounds(&jittery));
    assert_eq!(steady.pool().alive_count(), jittery.pool().alive_count());

    // One render per frame, not per tick
    assert_eq!(steady.renderer().frames.len(), 60);
    assert_eq!(jittery.renderer().frames.len(), 60);
}

#[test]
fn test_huge_frame_is_capped() {
    let mut game = game_with(steady_settings());
    let report = game.advance(5.0).unwrap();
    assert_eq!(report.ticks, 8);
    let report = game.advance(1.0 / 120.0).unwrap();
    assert!(report.ticks <= 1);
}

#[test]
fn test_dead_entities_are_never_drawn() {
    let mut game = game_with(Settings {
        starting_lives: 1,
        ..steady_settings()
    });
    let dead = game.fleet().aliens()[7].entity.bounds;
    game.fleet_mut().aliens_mut()[7].entity.kill();
    game.advance(0.0).unwrap();

    let frame = &game.renderer().frames[0];
    assert_eq!(frame.items.len(), 31 + 1);
    assert!(frame.items.iter().all(|item| item.bounds != dead));

    ram_player(&mut game, &[0]);
    game.advance(1.0 / 60.0).unwrap();
    let frame = game.renderer().frames.last().unwrap();
    assert_eq!(frame.phase, GamePhase::GameOver);
    assert!(frame.items.iter().all(|item| item.sprite != SpriteId::Ship));
    assert_eq!(
        frame
            .items
            .iter()
            .filter(|item| item.sprite == SpriteId::Alien)
            .count(),
        game.fleet().alive_count()
    );
}

#[test]
fn test_projectiles_never_exceed_cap() {
    let mut game = game_with(steady_settings());
    game.input_mut().hold(false, false, true);
    ticks(&mut game, 300);

    let most = game
        .telemetry()
        .samples
        .iter()
        .map(|sample| sample.projectiles_alive)
        .max()
        .unwrap();
    assert_eq!(most, 3);
}

#[test]
fn test_level_transition_and_faster_fleet() {
    let mut game = game_with(steady_settings());
    for alien in game.fleet_mut().aliens_mut() {
        alien.entity.kill();
    }
    game.tick().unwrap();
    assert_eq!(game.phase(), GamePhase::LevelClear);

    // Entities hold still during the transition
    game.input_mut().hold(false, true, false);
    let ship_x = game.player().entity.bounds.x;
    ticks(&mut game, 59);
    assert_eq!(game.phase(), GamePhase::LevelClear);
    assert_eq!(game.player().entity.bounds.x, ship_x);

    game.tick().unwrap();
    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.session().level, 2);
    assert_eq!(game.fleet().alive_count(), 32);
    assert!((game.fleet().layout().speed - 60.0 * 1.1).abs() < 1e-4);

    let samples = &game.telemetry().samples;
    assert_eq!(samples.last().map(|s| s.level), Some(2));
}

#[test]
fn test_restart_from_game_over() {
    let mut game = game_with(Settings {
        starting_lives: 1,
        ..steady_settings()
    });
    ram_player(&mut game, &[0]);
    game.tick().unwrap();
    assert_eq!(game.phase(), GamePhase::GameOver);
    game.take_events();

    game.input_mut().press(|input| input.restart = true);
    game.tick().unwrap();

    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.session().score, 0);
    assert_eq!(game.session().level, 1);
    assert_eq!(game.session().lives, 1);
    assert!(game.player().is_alive());
    assert_eq!(game.fleet().alive_count(), 32);
    assert_eq!(game.take_events().first(), Some(&GameEvent::Restarted));
}

#[test]
fn test_restart_with_new_settings() {
    let mut game = game_with(steady_settings());
    game.restart_with(validated(Settings {
        starting_lives: 5,
        fleet_rows: 2,
        ..Settings::default()
    }));
    assert_eq!(game.session().lives, 5);
    assert_eq!(game.fleet().alive_count(), 16);
    assert_eq!(game.take_events(), vec![GameEvent::Restarted]);
}

#[test]
fn test_export_and_fps_toggle_keys() {
    let mut game = game_with(steady_settings());
    game.input_mut().press(|input| {
        input.export_report = true;
        input.toggle_fps = true;
    });
    ticks(&mut game, 3);
    assert_eq!(game.telemetry().exports, 1);
    assert!(!game.show_fps());
}

#[test]
fn test_tick_samples_follow_the_session() {
    let mut game = game_with(steady_settings());
    ticks(&mut game, 4);
    let samples = &game.telemetry().samples;
    assert_eq!(
        samples.iter().map(|s| s.tick).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
    assert!(samples.iter().all(|s| s.aliens_alive == 32
        && s.lives == 3
        && s.phase == GamePhase::Running));
}

#[test]
fn test_terminal_surface_end_to_end() {
    let settings = validated(Settings::default());
    let terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    let mut game = GameLoop::new(
        settings,
        ScriptedInput::default(),
        TerminalSurface::new(terminal),
        PerformanceMonitor::default(),
    );
    game.advance(1.0 / 60.0).unwrap();

    let screen: String = game
        .renderer()
        .terminal()
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(screen.contains("Score: 0"));
    assert!(screen.contains("Lives: 3"));
    assert!(screen.contains("Aliens: 32"));
}
