use sbridge_core::event::Event;
use sbridge_runtime::dispatch::Dispatcher;
use sbridge_runtime::frame::Frame;
use sbridge_runtime::program::{Cmd, Model};
use sbridge_runtime::simulator::ProgramSimulator;
use std::sync::{Arc, Mutex};

type Parked = Arc<Mutex<Vec<(u32, Dispatcher<TestMsg>)>>>;

/// Parks every started effect so the test decides when, and in which order,
/// each one completes.
struct TestModel {
    parked: Parked,
    next_id: u32,
    last: Option<u32>,
    executed_after_quit: bool,
}

#[derive(Debug)]
enum TestMsg {
    Start,
    Done(u32),
    QuitInBatch,
    SetExecuted,
}

impl From<Event> for TestMsg {
    fn from(_: Event) -> Self {
        TestMsg::Start
    }
}

impl Model for TestModel {
    type Message = TestMsg;

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {
            TestMsg::Start => {
                self.next_id += 1;
                let id = self.next_id;
                let parked = Arc::clone(&self.parked);
                Cmd::effect(move |dispatch| {
                    parked.lock().unwrap().push((id, dispatch));
                })
            }
            TestMsg::Done(id) => {
                self.last = Some(id);
                Cmd::none()
            }
            TestMsg::QuitInBatch => Cmd::Batch(vec![
                Cmd::Quit,
                Cmd::Msg(TestMsg::SetExecuted), // Should NOT be executed
            ]),
            TestMsg::SetExecuted => {
                self.executed_after_quit = true;
                Cmd::None
            }
        }
    }

    fn view(&self, _frame: &mut Frame) {}
}

fn model() -> (TestModel, Parked) {
    let parked = Parked::default();
    (
        TestModel {
            parked: Arc::clone(&parked),
            next_id: 0,
            last: None,
            executed_after_quit: false,
        },
        parked,
    )
}

fn complete(parked: &Parked, id: u32) -> bool {
    let mut guard = parked.lock().unwrap();
    let pos = guard.iter().position(|(i, _)| *i == id).unwrap();
    let (_, dispatch) = guard.remove(pos);
    dispatch.send(TestMsg::Done(id))
}

#[test]
fn batch_stops_after_quit() {
    let (model, _) = model();
    let mut sim = ProgramSimulator::new(model);
    sim.init();

    sim.send(TestMsg::QuitInBatch);

    assert!(
        !sim.model().executed_after_quit,
        "Commands after Quit in Batch should not be executed"
    );
    assert!(!sim.is_running(), "Simulator should have stopped");
}

#[test]
fn completions_apply_in_arrival_order() {
    let (model, parked) = model();
    let mut sim = ProgramSimulator::new(model);
    sim.send(TestMsg::Start);
    sim.send(TestMsg::Start);
    assert_eq!(sim.model().last, None);

    assert!(complete(&parked, 2));
    sim.pump();
    assert_eq!(sim.model().last, Some(2));

    assert!(complete(&parked, 1));
    sim.pump();
    assert_eq!(sim.model().last, Some(1), "last arrival wins");
}

#[test]
fn effect_that_never_completes_leaves_model_alone() {
    let (model, parked) = model();
    let mut sim = ProgramSimulator::new(model);
    sim.send(TestMsg::Start);
    assert_eq!(sim.pump(), 0);
    assert_eq!(sim.model().last, None);

    // Dropping the parked dispatcher is the same as never answering.
    parked.lock().unwrap().clear();
    assert_eq!(sim.pump(), 0);
    assert!(sim.is_running());
}

#[test]
fn completion_after_teardown_is_dropped() {
    let (model, parked) = model();
    let mut sim = ProgramSimulator::new(model);
    sim.send(TestMsg::Start);
    drop(sim);

    assert!(!complete(&parked, 1));
}

#[test]
fn completion_from_worker_thread() {
    let (model, parked) = model();
    let mut sim = ProgramSimulator::new(model);
    sim.send(TestMsg::Start);

    let worker = std::thread::spawn(move || complete(&parked, 1));
    assert!(sim.wait_for_message(std::time::Duration::from_secs(5)));
    assert!(worker.join().unwrap());
    assert_eq!(sim.model().last, Some(1));
}
