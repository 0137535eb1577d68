use super::*;

fn cfg() -> EditorConfig {
    EditorConfig {
        width: 4,
        height: 4,
        display: 8,
        fps: 10,
        max_frames: 4,
        undo_limit: 3,
        initial_frames: 3,
        onion_depth: 2,
    }
}

fn editor() -> Editor {
    Editor::new(cfg()).unwrap()
}

fn draw(ed: &mut Editor, from: (i32, i32), to: (i32, i32)) -> bool {
    ed.pointer_down(Point::new(from.0, from.1)).unwrap();
    ed.pointer_move(Point::new(to.0, to.1)).unwrap();
    ed.pointer_up()
}

#[test]
fn stroke_paints_and_commits_history() {
    let mut ed = editor();
    assert!(draw(&mut ed, (0, 0), (3, 0)));
    let buf = ed.store().current_buffer();
    assert_eq!(&buf.samples()[..4], &[0, 0, 0, 0]);
    assert_eq!(ed.store().history(0).unwrap().undo_len(), 1);

    ed.undo().unwrap();
    assert!(ed.store().current_buffer().is_blank());
    ed.redo().unwrap();
    assert_eq!(&ed.store().current_buffer().samples()[..4], &[0, 0, 0, 0]);
    assert_eq!(ed.undo().and_then(|_| ed.undo()), Err(Refusal::NothingToUndo));
}

#[test]
fn eraser_and_gray_follow_tool_state() {
    let mut ed = editor();
    ed.set_gray(90);
    ed.pointer_down(Point::new(1, 1)).unwrap();
    ed.pointer_up();
    assert_eq!(ed.store().current_buffer().get(1, 1), Some(90));

    ed.set_tool(Tool::Eraser);
    ed.pointer_down(Point::new(1, 1)).unwrap();
    ed.pointer_up();
    assert_eq!(ed.store().current_buffer().get(1, 1), Some(255));
}

#[test]
fn out_of_bounds_pointer_is_clamped() {
    let mut ed = editor();
    ed.pointer_down(Point::new(-5, 99)).unwrap();
    ed.pointer_up();
    assert_eq!(ed.store().current_buffer().get(0, 3), Some(0));
}

#[test]
fn pointer_move_without_down_is_ignored() {
    let mut ed = editor();
    assert_eq!(ed.pointer_move(Point::new(1, 1)), Ok(false));
    assert!(!ed.pointer_up());
    assert!(ed.store().current_buffer().is_blank());
}

#[test]
fn editing_while_playing_stops_playback_first() {
    let mut ed = editor();
    let t0 = Instant::now();
    ed.set_playing(true, t0).unwrap();
    assert!(ed.is_playing());
    assert!(ed.store().is_playing());

    let idx = ed.add_blank_after_current().unwrap();
    assert!(!ed.is_playing());
    assert!(!ed.store().is_playing());
    assert_eq!(idx, 1);
    assert_eq!(ed.store().len(), 4);
}

#[test]
fn frame_limit_is_reported() {
    let mut ed = editor();
    ed.add_blank_after_current().unwrap();
    assert_eq!(
        ed.duplicate_after_current(),
        Err(Refusal::FrameLimit { max: 4 })
    );
    assert_eq!(ed.store().len(), 4);
}

#[test]
fn tick_advances_and_wraps_current_frame() {
    let mut ed = editor();
    ed.select(1).unwrap();
    let t0 = Instant::now();
    ed.set_playing(true, t0).unwrap();
    let step = Duration::from_millis(cfg().frame_interval_ms());

    assert_eq!(ed.tick(t0), None);
    assert_eq!(ed.tick(t0 + step), Some(1));
    assert_eq!(ed.tick(t0 + step * 2), Some(2));
    assert_eq!(ed.tick(t0 + step * 3), Some(0));
    assert_eq!(ed.store().current(), 0);

    assert_eq!(ed.toggle_playback(t0), Ok(false));
    assert_eq!(ed.tick(t0 + step * 10), None);
}

#[test]
fn preview_hides_onion_skin_while_playing() {
    let mut ed = editor();
    ed.pointer_down(Point::new(0, 0)).unwrap();
    ed.pointer_up();
    ed.select(1).unwrap();

    let still = ed.preview().unwrap();
    assert_eq!(&still.data[..4], &[110, 110, 110, 255]);

    ed.set_playing(true, Instant::now()).unwrap();
    let playing = ed.preview().unwrap();
    assert_eq!(&playing.data[..4], &[255, 255, 255, 255]);
}

#[test]
fn save_then_load_restores_frames() {
    let mut ed = editor();
    draw(&mut ed, (0, 0), (0, 3));
    let saved = ed.save_project();
    assert_eq!(saved.frame_count, 3);

    let mut other = editor();
    other.add_blank_after_current().unwrap();
    other.load_project(&saved).unwrap();
    assert_eq!(other.store().len(), 3);
    assert_eq!(other.store().current(), 0);
    assert_eq!(other.store().buffers(), ed.store().buffers());
    assert_eq!(other.store().history(0).unwrap().undo_len(), 0);
}

#[test]
fn failed_load_leaves_session_untouched() {
    let mut ed = editor();
    draw(&mut ed, (1, 1), (2, 2));
    let before = ed.store().buffers().to_vec();

    let mut wrong = ed.save_project();
    wrong.width = 8;
    assert!(ed.load_project(&wrong).is_err());

    let mut bad_frame = ed.save_project();
    bad_frame.frames[1] = "AAAA".to_string();
    assert!(ed.load_project(&bad_frame).is_err());

    assert_eq!(ed.store().buffers(), before.as_slice());
    assert_eq!(ed.store().history(0).unwrap().undo_len(), 1);
}

#[test]
fn new_project_resets_frames() {
    let mut ed = editor();
    ed.add_blank_after_current().unwrap();
    draw(&mut ed, (0, 0), (1, 1));
    ed.new_project().unwrap();
    assert_eq!(ed.store().len(), 3);
    assert!(ed.store().buffers().iter().all(|b| b.is_blank()));
}

#[test]
fn export_flag_is_released_after_failure() {
    let mut ed = editor();
    let dir = std::env::temp_dir().join(format!("flipframe-editor-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    // a directory path cannot be opened as a file
    assert!(ed.export_gif(&dir).is_err());
    assert!(!ed.is_exporting());

    let out = dir.join("anim.gif");
    ed.export_gif(&out).unwrap();
    assert!(!ed.is_exporting());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn live_export_job_blocks_edits_until_dropped() {
    let mut ed = editor();
    ed.pointer_down(Point::new(0, 0)).unwrap();

    let job = ed.begin_export().unwrap();
    assert!(ed.is_exporting());
    // the open stroke is committed before the snapshot
    assert_eq!(job.frames()[0].get(0, 0), Some(0));
    assert_eq!(ed.store().history(0).unwrap().undo_len(), 1);

    assert_eq!(ed.pointer_down(Point::new(1, 1)), Err(Refusal::Exporting));
    assert_eq!(ed.undo(), Err(Refusal::Exporting));
    assert_eq!(ed.add_blank_after_current(), Err(Refusal::Exporting));
    assert_eq!(ed.new_project(), Err(Refusal::Exporting));
    assert_eq!(
        ed.set_playing(true, Instant::now()),
        Err(Refusal::Exporting)
    );
    let saved = ed.save_project();
    assert!(matches!(ed.load_project(&saved), Err(FlipError::Busy(_))));
    assert!(matches!(ed.begin_export(), Err(FlipError::Busy(_))));

    let bytes = job.encode(Vec::new()).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    drop(job);

    assert!(!ed.is_exporting());
    assert_eq!(ed.add_blank_after_current(), Ok(1));
    assert_eq!(ed.store().len(), 4);
}

#[test]
fn export_job_runs_on_worker_thread() {
    let mut ed = editor();
    let job = ed.begin_export().unwrap();
    let handle = std::thread::spawn(move || job.encode(Vec::new()).map(|b| b.len()));
    assert!(handle.join().unwrap().unwrap() > 0);
    assert!(!ed.is_exporting());
    assert_eq!(ed.undo(), Err(Refusal::NothingToUndo));
}

#[test]
fn export_stops_playback() {
    let mut ed = editor();
    ed.set_playing(true, Instant::now()).unwrap();
    let job = ed.begin_export().unwrap();
    assert!(!ed.is_playing());
    assert!(!ed.store().is_playing());
    assert_eq!(job.frames().len(), 3);
}

#[test]
fn delete_requires_confirmation_and_keeps_one_frame() {
    let mut ed = editor();
    assert_eq!(ed.delete_current(|_| false), Err(Refusal::Cancelled));
    ed.delete_current(|_| true).unwrap();
    ed.delete_current(|_| true).unwrap();
    assert_eq!(ed.delete_current(|_| true), Err(Refusal::LastFrame));
    assert_eq!(ed.store().len(), 1);
}
