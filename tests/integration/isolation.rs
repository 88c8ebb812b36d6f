//! Scope stacks are per execution context

use std::sync::{Arc, Barrier};
use std::thread;

use athena_router::{Access, RoutingSession, Target};

use crate::grouped_with_default;

#[test]
fn test_threads_do_not_see_each_others_scopes() {
    let resolver = grouped_with_default();
    let barrier = Arc::new(Barrier::new(3));

    let cases = [
        (Some(Target::slave_group("slaves2")), "slave21"),
        (Some(Target::connection("slave32")), "slave32"),
        (None, "slave11"),
    ];

    let handles: Vec<_> = cases
        .into_iter()
        .enumerate()
        .map(|(i, (target, expected))| {
            let resolver = resolver.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let session = RoutingSession::new(i as u32, resolver);
                let _guard = target.map(|t| session.enter(t).unwrap());

                // Every thread has pushed (or not) before anyone resolves
                barrier.wait();
                for _ in 0..100 {
                    assert_eq!(session.resolve(Access::Read).name(), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_own_their_sessions() {
    let resolver = grouped_with_default();

    let mut tasks = Vec::new();
    for i in 0..8u32 {
        let resolver = resolver.clone();
        tasks.push(tokio::spawn(async move {
            let session = RoutingSession::new(i, resolver);
            let (target, expected) = if i % 2 == 0 {
                (Target::slave_group("slaves2"), "slave21")
            } else {
                (Target::Master, "master")
            };

            session.scope().push(target).unwrap();
            tokio::task::yield_now().await;
            let picked = session.resolve(Access::Read);
            tokio::task::yield_now().await;
            session.scope().pop().unwrap();

            assert_eq!(picked.name(), expected);
            assert_eq!(session.resolve(Access::Read).name(), "slave11");
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
}
