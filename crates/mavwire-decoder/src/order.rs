//! Ticket ordering for handler delivery across concurrent `ingest` callers.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Tickets {
    issued: u64,
    serving: u64,
}

/// Hands out delivery turns in the order tickets were taken.
///
/// Tickets are taken under the decoder's state lock, so turns follow the order
/// in which frames were consumed. Waiting happens with no decoder lock held.
#[derive(Debug, Default)]
pub(crate) struct DeliveryOrder {
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

impl DeliveryOrder {
    pub(crate) fn ticket(&self) -> u64 {
        let mut tickets = self.lock();
        let ticket = tickets.issued;
        tickets.issued = tickets.issued.wrapping_add(1);
        ticket
    }

    /// Block until `ticket` is served. Dropping the returned turn, also during
    /// unwinding, passes it to the next ticket.
    pub(crate) fn wait(&self, ticket: u64) -> Turn<'_> {
        let guard = self.lock();
        let _served = self
            .turn
            .wait_while(guard, |tickets| tickets.serving != ticket)
            .unwrap_or_else(PoisonError::into_inner);
        Turn { order: self }
    }

    fn lock(&self) -> MutexGuard<'_, Tickets> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The right to deliver, held for the duration of one `ingest` call's
/// deliveries.
#[derive(Debug)]
pub(crate) struct Turn<'a> {
    order: &'a DeliveryOrder,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        let mut tickets = self.order.lock();
        tickets.serving = tickets.serving.wrapping_add(1);
        drop(tickets);
        self.order.turn.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn turns_follow_ticket_order() {
        let order = Arc::new(DeliveryOrder::default());
        let first = order.ticket();
        let second = order.ticket();
        let (tx, rx) = mpsc::channel();

        let waiter = {
            let order = Arc::clone(&order);
            let tx = tx.clone();
            thread::spawn(move || {
                let _turn = order.wait(second);
                tx.send(second).unwrap();
            })
        };

        thread::sleep(Duration::from_millis(20));
        {
            let _turn = order.wait(first);
            tx.send(first).unwrap();
        }
        waiter.join().unwrap();

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn panicking_holder_still_passes_turn() {
        let order = Arc::new(DeliveryOrder::default());
        let first = order.ticket();
        let second = order.ticket();

        let panicked = {
            let order = Arc::clone(&order);
            thread::spawn(move || {
                let _turn = order.wait(first);
                panic!("handler failed");
            })
            .join()
        };
        assert!(panicked.is_err());

        let _turn = order.wait(second);
    }
}
