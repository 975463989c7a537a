use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn queue_of(names: &[&str]) -> PlayQueue {
    let mut q = PlayQueue::new();
    q.add_multiple(names.iter().map(|n| format!("/m/{n}.mp3")));
    q
}

fn p(name: &str) -> PathBuf {
    PathBuf::from(format!("/m/{name}.mp3"))
}

fn names(q: &PlayQueue) -> Vec<String> {
    q.items()
        .iter()
        .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn next_starts_at_front_and_stops_at_end_without_repeat() {
    let mut q = queue_of(&["a", "b"]);
    assert_eq!(q.current(), None);
    assert_eq!(q.next(), Some(p("a")));
    assert_eq!(q.next(), Some(p("b")));
    assert_eq!(q.next(), None);
    assert_eq!(q.current_index(), Some(1));
}

#[test]
fn next_wraps_with_repeat_all() {
    let mut q = queue_of(&["a", "b"]);
    q.set_repeat(RepeatMode::All);
    q.play_index(1);
    assert_eq!(q.next(), Some(p("a")));
}

#[test]
fn repeat_one_applies_to_track_end_only() {
    let mut q = queue_of(&["a", "b"]);
    q.set_repeat(RepeatMode::One);
    q.play_index(0);
    assert_eq!(q.on_track_end(), Some(p("a")));
    assert_eq!(q.next(), Some(p("b")));
}

#[test]
fn track_end_on_last_entry_without_repeat_is_none() {
    let mut q = queue_of(&["a"]);
    q.next();
    assert_eq!(q.on_track_end(), None);
    assert_eq!(q.current(), Some(Path::new("/m/a.mp3")));
}

#[test]
fn previous_follows_history_to_jumped_from_entry() {
    let mut q = queue_of(&["a", "b", "c", "d"]);
    q.play_index(0);
    q.play_index(3);
    assert_eq!(q.previous(), Some(p("a")));
    assert!(q.history().is_empty());
}

#[test]
fn previous_steps_back_without_history_and_wraps_with_repeat_all() {
    let mut q = queue_of(&["a", "b", "c"]);
    q.play_index(2);
    q.previous();
    assert!(q.history().is_empty());
    assert_eq!(q.previous(), Some(p("a")));
    // Start of queue without repeat
    q.clear();
    q.add_multiple([p("a"), p("b")]);
    q.play_index(0);
    q.history.clear();
    assert_eq!(q.previous(), None);
    q.set_repeat(RepeatMode::All);
    assert_eq!(q.previous(), Some(p("b")));
}

#[test]
fn previous_skips_history_entries_no_longer_queued() {
    let mut q = queue_of(&["a", "b", "c"]);
    q.play_index(0);
    q.play_index(1);
    q.play_index(2);
    q.remove(1);
    assert_eq!(q.previous(), Some(p("a")));
}

#[test]
fn history_is_capped() {
    let mut q = queue_of(&["a", "b"]);
    q.set_repeat(RepeatMode::All);
    for _ in 0..HISTORY_LIMIT + 20 {
        q.next();
    }
    assert_eq!(q.history().len(), HISTORY_LIMIT);
}

#[test]
fn add_next_inserts_after_current_or_at_front() {
    let mut q = queue_of(&["a", "b"]);
    q.add_next(p("x"));
    assert_eq!(names(&q), vec!["x", "a", "b"]);

    q.play_index(1);
    q.add_next(p("y"));
    assert_eq!(names(&q), vec!["x", "a", "y", "b"]);
    assert_eq!(q.upcoming(), &[p("y"), p("b")]);
}

#[test]
fn remove_adjusts_current_pointer() {
    let mut q = queue_of(&["a", "b", "c", "d"]);
    q.play_index(2);

    assert_eq!(q.remove(0), Some(p("a")));
    assert_eq!(q.current(), Some(p("c").as_path()));

    // removing current keeps pointer on the following entry
    q.remove(1);
    assert_eq!(q.current(), Some(p("d").as_path()));

    // removing the last current entry falls back to the new last
    q.remove(1);
    assert_eq!(q.current(), Some(p("b").as_path()));

    assert_eq!(q.remove(9), None);
    q.remove(0);
    assert!(q.is_empty());
    assert_eq!(q.current_index(), None);
}

#[test]
fn move_track_keeps_current_on_same_entry() {
    let mut q = queue_of(&["a", "b", "c", "d"]);
    q.play_index(1);

    assert!(q.move_track(0, 3));
    assert_eq!(names(&q), vec!["b", "c", "d", "a"]);
    assert_eq!(q.current(), Some(p("b").as_path()));

    assert!(q.move_track(3, 0));
    assert_eq!(q.current(), Some(p("b").as_path()));

    assert!(q.move_track(1, 2));
    assert_eq!(q.current_index(), Some(2));
    assert!(!q.move_track(0, 10));
}

#[test]
fn shuffle_keeps_played_prefix_and_unshuffle_restores_order() {
    let mut q = queue_of(&["a", "b", "c", "d", "e", "f", "g", "h"]);
    q.play_index(2);
    let mut rng = StdRng::seed_from_u64(7);

    q.set_shuffle_with(true, &mut rng);
    assert!(q.is_shuffle());
    assert_eq!(&names(&q)[..3], &["a", "b", "c"]);
    let mut rest = names(&q)[3..].to_vec();
    rest.sort();
    assert_eq!(rest, vec!["d", "e", "f", "g", "h"]);
    assert_eq!(q.current(), Some(p("c").as_path()));

    q.next();
    let now = q.current().unwrap().to_path_buf();
    q.add(p("z"));
    q.set_shuffle_with(false, &mut rng);
    assert_eq!(names(&q), vec!["a", "b", "c", "d", "e", "f", "g", "h", "z"]);
    assert_eq!(q.current(), Some(now.as_path()));
}

#[test]
fn unshuffle_forgets_entries_removed_while_shuffled() {
    let mut q = queue_of(&["a", "b", "c"]);
    let mut rng = StdRng::seed_from_u64(1);
    q.set_shuffle_with(true, &mut rng);
    let idx = q.items().iter().position(|x| x == &p("b")).unwrap();
    q.remove(idx);
    q.set_shuffle_with(false, &mut rng);
    assert_eq!(names(&q), vec!["a", "c"]);
}

#[test]
fn clear_upcoming_keeps_current_and_history() {
    let mut q = queue_of(&["a", "b", "c", "d"]);
    q.play_index(0);
    q.next();
    q.clear_upcoming();
    assert_eq!(names(&q), vec!["a", "b"]);
    assert_eq!(q.history(), &[p("a")]);

    q.clear();
    assert!(q.is_empty());
    assert!(q.history().is_empty());
}

#[test]
fn shuffle_remaining_leaves_current_prefix() {
    let mut q = queue_of(&["a", "b", "c", "d", "e"]);
    q.play_index(1);
    q.shuffle_remaining_with(&mut StdRng::seed_from_u64(3));
    assert_eq!(&names(&q)[..2], &["a", "b"]);
    assert_eq!(q.len(), 5);
    assert!(!q.is_shuffle());
}

#[test]
fn repeat_cycles_none_all_one() {
    let mut q = PlayQueue::new();
    assert_eq!(q.cycle_repeat(), RepeatMode::All);
    assert_eq!(q.cycle_repeat(), RepeatMode::One);
    assert_eq!(q.cycle_repeat(), RepeatMode::None);
    assert_eq!(serde_json::to_string(&RepeatMode::All).unwrap(), "\"all\"");
}
