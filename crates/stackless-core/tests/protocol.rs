//! Integration tests for the resumable procedure protocol

use stackless_core::{
    resume_labels, settle, Awaited, Context, Entry, Slot, Status, MAX_DEPTH,
};

resume_labels! {
    enum RecorderAt { Next }
}

resume_labels! {
    enum LinkAt { Child }
}

resume_labels! {
    enum LeafAt { Tick }
}

resume_labels! {
    enum WideAt { A, B, C }
}

/// Yields `yields` times, logging the step reached on every invocation
struct Recorder {
    yields: u32,
    step: u32,
    log: Vec<u32>,
}

fn recorder(ctx: &mut Context, state: &mut Recorder) -> Status {
    let frame = match ctx.enter::<RecorderAt>() {
        Entry::Start(frame) => {
            state.step = 0;
            frame
        }
        Entry::Resume(frame, RecorderAt::Next) => {
            state.step += 1;
            frame
        }
        Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
        Entry::Finished(status) => return status,
    };

    state.log.push(state.step);
    if state.step == state.yields {
        ctx.exit(frame, Status::Ok)
    } else {
        ctx.suspend(frame, RecorderAt::Next)
    }
}

/// A chain of `levels` procedures, each awaiting the next; the last one
/// yields `yields` times before finishing with `App(7)`
struct Chain {
    levels: usize,
    yields: u32,
    ticks: u32,
    observed: Vec<Status>,
    exits: Vec<(usize, Status)>,
}

impl Chain {
    fn new(levels: usize, yields: u32) -> Self {
        Self {
            levels,
            yields,
            ticks: 0,
            observed: Vec::new(),
            exits: Vec::new(),
        }
    }
}

fn link(ctx: &mut Context, chain: &mut Chain, level: usize) -> Status {
    if level + 1 == chain.levels {
        return leaf(ctx, chain, level);
    }

    let frame = match ctx.enter::<LinkAt>() {
        Entry::Start(frame) => {
            ctx.prime(frame);
            frame
        }
        Entry::Resume(frame, LinkAt::Child) => frame,
        Entry::Cancelled(frame) => {
            chain.exits.push((level, Status::Cancelled));
            return ctx.exit(frame, Status::Cancelled);
        }
        Entry::Finished(status) => return status,
    };

    let child = link(ctx, chain, level + 1);
    if level == 0 {
        chain.observed.push(child);
    }
    let status = match ctx.settle(frame, LinkAt::Child, child) {
        Awaited::Suspend => return Status::Running,
        Awaited::Unwind(status) => {
            chain.exits.push((level, status));
            return ctx.exit(frame, status);
        }
        Awaited::Done(status) => status,
    };

    chain.exits.push((level, status));
    ctx.exit(frame, status)
}

fn leaf(ctx: &mut Context, chain: &mut Chain, level: usize) -> Status {
    let frame = match ctx.enter::<LeafAt>() {
        Entry::Start(frame) | Entry::Resume(frame, LeafAt::Tick) => frame,
        Entry::Cancelled(frame) => {
            chain.exits.push((level, Status::Cancelled));
            return ctx.exit(frame, Status::Cancelled);
        }
        Entry::Finished(status) => return status,
    };

    chain.ticks += 1;
    if chain.ticks <= chain.yields {
        ctx.suspend(frame, LeafAt::Tick)
    } else {
        chain.exits.push((level, Status::App(7)));
        ctx.exit(frame, Status::App(7))
    }
}

fn drive_to_end(ctx: &mut Context, chain: &mut Chain) -> (usize, Status) {
    let mut drives = 0;
    loop {
        drives += 1;
        let status = link(ctx, chain, 0);
        if status.is_terminal() {
            return (drives, status);
        }
    }
}

#[test]
fn test_resume_continues_after_each_yield() {
    for yields in [0, 1, 5] {
        let mut ctx = Context::default();
        let mut state = Recorder {
            yields,
            step: 0,
            log: Vec::new(),
        };

        let mut invocations = 0;
        let status = loop {
            invocations += 1;
            let status = recorder(&mut ctx, &mut state);
            assert_eq!(ctx.depth(), None, "depth must be restored after each call");
            if status.is_terminal() {
                break status;
            }
        };

        assert_eq!(status, Status::Ok);
        assert_eq!(invocations, yields as usize + 1);
        assert_eq!(state.log, (0..=yields).collect::<Vec<_>>());
        assert!(!ctx.is_running());
    }
}

#[test]
fn test_await_is_transparent() {
    let mut ctx = Context::default();
    let mut chain = Chain::new(3, 4);

    let (drives, status) = drive_to_end(&mut ctx, &mut chain);

    assert_eq!(drives, 5);
    assert_eq!(status, Status::App(7));
    // The outermost frame only ever sees Running or the terminal status
    assert_eq!(
        chain.observed,
        vec![
            Status::Running,
            Status::Running,
            Status::Running,
            Status::Running,
            Status::App(7)
        ]
    );
    assert_eq!(
        chain.exits,
        vec![(2, Status::App(7)), (1, Status::App(7)), (0, Status::App(7))]
    );
}

#[test]
fn test_cancellation_cascades_through_every_level() {
    let mut ctx = Context::default();
    let mut chain = Chain::new(5, 100);

    assert_eq!(link(&mut ctx, &mut chain, 0), Status::Running);
    assert_eq!(link(&mut ctx, &mut chain, 0), Status::Running);
    assert_eq!(ctx.live_frames(), 5);

    assert!(ctx.cancel());
    assert_eq!(ctx.slot(4), Some(Slot::Cancel));
    assert!(ctx.is_running(), "cancellation is deferred to the next drive");

    assert_eq!(link(&mut ctx, &mut chain, 0), Status::Cancelled);
    assert_eq!(
        chain.exits,
        (0..5).rev().map(|level| (level, Status::Cancelled)).collect::<Vec<_>>()
    );
    assert_eq!(chain.ticks, 2);
    assert_eq!(ctx.live_frames(), 0);
    assert!(ctx.is_cancelled());
}

#[test]
fn test_cancel_while_parent_suspended_on_its_own() {
    let mut ctx = Context::default();
    let mut state = Recorder {
        yields: 10,
        step: 0,
        log: Vec::new(),
    };

    assert_eq!(recorder(&mut ctx, &mut state), Status::Running);
    assert!(ctx.cancel());
    assert_eq!(recorder(&mut ctx, &mut state), Status::Cancelled);
    assert_eq!(state.log, vec![0]);
}

#[test]
fn test_nesting_up_to_max_depth_is_allowed() {
    let mut ctx = Context::default();
    let mut chain = Chain::new(MAX_DEPTH, 1);

    let (drives, status) = drive_to_end(&mut ctx, &mut chain);
    assert_eq!(drives, 2);
    assert_eq!(status, Status::App(7));
}

#[test]
fn test_nesting_past_max_depth_overflows() {
    let mut sibling = Context::default();
    let mut sibling_state = Recorder {
        yields: 3,
        step: 0,
        log: Vec::new(),
    };
    assert_eq!(recorder(&mut sibling, &mut sibling_state), Status::Running);
    let sibling_slot = sibling.slot(0);

    let mut ctx = Context::default();
    let mut chain = Chain::new(MAX_DEPTH + 1, 1);
    assert_eq!(link(&mut ctx, &mut chain, 0), Status::StackOverflow);
    assert_eq!(ctx.depth(), None);
    assert_eq!(ctx.status(), Status::StackOverflow);
    assert_eq!(chain.ticks, 0);
    assert!(chain
        .exits
        .iter()
        .all(|&(_, status)| status == Status::StackOverflow));
    assert_eq!(chain.exits.len(), MAX_DEPTH);

    assert_eq!(sibling.slot(0), sibling_slot);
    assert_eq!(recorder(&mut sibling, &mut sibling_state), Status::Running);
}

#[test]
fn test_unknown_marker_is_runtime_corruption() {
    let mut ctx: Context = Context::default();
    let Entry::Start(frame) = ctx.enter::<WideAt>() else {
        panic!("expected a fresh frame");
    };
    assert_eq!(ctx.suspend(frame, WideAt::C), Status::Running);

    // Resumed by a procedure that does not define that marker
    assert_eq!(
        ctx.enter::<LinkAt>(),
        Entry::Finished(Status::RuntimeCorruption)
    );
    assert_eq!(ctx.depth(), None);
    assert_eq!(ctx.status(), Status::RuntimeCorruption);
}

struct Shielded {
    inner: Recorder,
    seen: Option<Status>,
}

fn shielded(ctx: &mut Context, state: &mut Shielded) -> Status {
    let frame = match ctx.enter::<LinkAt>() {
        Entry::Start(frame) => {
            ctx.prime(frame);
            frame
        }
        Entry::Resume(frame, LinkAt::Child) => frame,
        Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
        Entry::Finished(status) => return status,
    };

    let child = recorder(ctx, &mut state.inner);
    match ctx.settle_catching(frame, LinkAt::Child, child) {
        Awaited::Suspend => Status::Running,
        Awaited::Unwind(status) => ctx.exit(frame, status),
        Awaited::Done(status) => {
            state.seen = Some(status);
            ctx.exit(frame, Status::App(3))
        }
    }
}

#[test]
fn test_catching_await_absorbs_cancellation() {
    let mut ctx = Context::default();
    let mut state = Shielded {
        inner: Recorder {
            yields: 10,
            step: 0,
            log: Vec::new(),
        },
        seen: None,
    };

    assert_eq!(shielded(&mut ctx, &mut state), Status::Running);
    assert!(ctx.cancel());
    assert_eq!(ctx.slot(1), Some(Slot::Cancel));
    assert_eq!(shielded(&mut ctx, &mut state), Status::App(3));
    assert_eq!(state.seen, Some(Status::Cancelled));
}

struct Pair {
    first: Recorder,
    second: Recorder,
}

resume_labels! {
    enum PairAt { First, Second }
}

fn pair(ctx: &mut Context, state: &mut Pair) -> Status {
    let (frame, at) = match ctx.enter::<PairAt>() {
        Entry::Start(frame) => (frame, None),
        Entry::Resume(frame, at) => (frame, Some(at)),
        Entry::Cancelled(frame) => return ctx.exit(frame, Status::Cancelled),
        Entry::Finished(status) => return status,
    };

    if at.is_none() {
        ctx.prime(frame);
    }
    if at != Some(PairAt::Second) {
        settle!(ctx, frame, PairAt::First, recorder(ctx, &mut state.first));
        ctx.prime(frame);
    }
    let second = settle!(ctx, frame, PairAt::Second, recorder(ctx, &mut state.second));
    ctx.exit(frame, second)
}

#[test]
fn test_sequential_awaits_reuse_the_child_slot() {
    let mut ctx = Context::default();
    let mut state = Pair {
        first: Recorder {
            yields: 2,
            step: 0,
            log: Vec::new(),
        },
        second: Recorder {
            yields: 1,
            step: 0,
            log: Vec::new(),
        },
    };

    let mut drives = 0;
    let status = loop {
        drives += 1;
        let status = pair(&mut ctx, &mut state);
        if status.is_terminal() {
            break status;
        }
    };

    assert_eq!(status, Status::Ok);
    // Three invocations of the first child, the last one also starts the second
    assert_eq!(drives, 4);
    assert_eq!(state.first.log, vec![0, 1, 2]);
    assert_eq!(state.second.log, vec![0, 1]);
}
