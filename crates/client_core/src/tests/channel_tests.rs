use super::*;
use std::thread;

fn delivery(kind: FetchKind, result: ClassifiedResult) -> Delivery {
    Delivery {
        request_id: RequestId::new(),
        kind,
        result,
    }
}

#[test]
fn single_sender_deliveries_arrive_in_order() {
    let (tx, rx) = result_channel();
    let messages = ["first", "second", "third"];
    for message in messages {
        assert_eq!(
            tx.deliver(delivery(
                FetchKind::Favourites,
                ClassifiedResult::DomainError(message.to_string())
            )),
            DeliveryOutcome::Delivered
        );
    }

    let received: Vec<_> = rx
        .drain()
        .into_iter()
        .map(|d| match d.result {
            ClassifiedResult::DomainError(message) => message,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(received, messages);
}

#[test]
fn concurrent_workers_each_deliver_intact() {
    let (tx, rx) = result_channel();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tx = tx.clone();
            thread::spawn(move || {
                tx.deliver(delivery(
                    FetchKind::Recommendations,
                    ClassifiedResult::DomainError(format!("worker-{i}")),
                ))
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("join"), DeliveryOutcome::Delivered);
    }

    let mut received: Vec<_> = rx
        .drain()
        .into_iter()
        .map(|d| match d.result {
            ClassifiedResult::DomainError(message) => message,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    received.sort();
    let mut expected: Vec<_> = (0..8).map(|i| format!("worker-{i}")).collect();
    expected.sort();
    assert_eq!(received, expected);
}

#[test]
fn delivery_to_dropped_consumer_is_a_no_op() {
    let (tx, rx) = result_channel();
    drop(rx);

    assert!(!tx.is_consumer_alive());
    assert_eq!(
        tx.deliver(delivery(FetchKind::Favourites, ClassifiedResult::Empty)),
        DeliveryOutcome::ConsumerGone
    );
}

#[test]
fn closed_consumer_rejects_new_deliveries_but_keeps_queued_ones() {
    let (tx, rx) = result_channel();
    tx.deliver(delivery(FetchKind::AddFavourites, ClassifiedResult::Empty));
    rx.close();

    assert!(!rx.is_open());
    assert_eq!(
        tx.deliver(delivery(FetchKind::AddFavourites, ClassifiedResult::Empty)),
        DeliveryOutcome::ConsumerGone
    );
    assert_eq!(rx.drain().len(), 1);
}

#[test]
fn recv_timeout_returns_none_when_idle() {
    let (_tx, rx) = result_channel();
    assert!(rx.recv_timeout(Duration::from_millis(10)).is_none());
    assert!(rx.try_recv().is_none());
}
