// src/walk/queue.rs
// =============================================================================
// The frontier of the walk: frames waiting to be visited.
//
// How it works:
// 1. offer() a frame
// 2. It's rejected if the frontier is full, or if its GID was ever accepted
//    before (even if that frame has long been visited)
// 3. Otherwise its GID goes into the seen-set and the frame joins the frontier
// 4. drain() pops frames from the front until the frontier is empty
//
// Insertion modes:
// - Tail (default): plain breadth-first order
// - Random: each frame lands at a uniformly random index. On graphs with huge
//   hubs, FIFO spends its whole budget expanding the first hub; random
//   insertion mixes in deeper nodes while max_size still caps memory.
//
// The seen-set only ever grows. The frontier is bounded only when max_size
// is set; otherwise a large connected graph can grow it without limit.
// =============================================================================

use super::frame::{Frame, Gid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

#[derive(Debug)]
pub struct TraversalQueue {
    frontier: VecDeque<Frame>,
    seen: HashSet<Gid>,
    max_size: Option<usize>,
    random_insertion: bool,
    rng: StdRng,
}

impl Default for TraversalQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TraversalQueue {
    /// An unbounded FIFO queue.
    pub fn new() -> Self {
        Self {
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            max_size: None,
            random_insertion: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Caps the frontier length. `None` means unbounded.
    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_random_insertion(mut self, random_insertion: bool) -> Self {
        self.random_insertion = random_insertion;
        self
    }

    /// Makes random insertion reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Adds a frame unless the frontier is full or its GID was seen before.
    ///
    /// Returns true if the frame was added. A rejected frame leaves the
    /// queue untouched.
    pub fn offer(&mut self, frame: Frame) -> bool {
        if let Some(max) = self.max_size {
            if self.frontier.len() >= max {
                return false;
            }
        }
        if self.seen.contains(frame.gid()) {
            return false;
        }

        self.seen.insert(frame.gid().to_string());
        if self.random_insertion {
            let index = self.rng.gen_range(0..=self.frontier.len());
            self.frontier.insert(index, frame);
        } else {
            self.frontier.push_back(frame);
        }

        true
    }

    /// Wraps `gid` in a new frame and offers it.
    pub fn offer_gid(&mut self, gid: impl Into<Gid>, parent: Option<Arc<Frame>>) -> bool {
        self.offer(Frame::new(gid, parent))
    }

    /// Takes the frame at the head of the frontier.
    pub fn pop_front(&mut self) -> Option<Frame> {
        self.frontier.pop_front()
    }

    /// Pops frames until the frontier is empty.
    ///
    /// More frames can be offered through the returned [`Drain`] between
    /// pulls; they are picked up by later pulls. Stop pulling to stop early.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { queue: self }
    }

    /// Frames waiting to be visited.
    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// GIDs ever accepted, including those already visited.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, gid: &str) -> bool {
        self.seen.contains(gid)
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// GIDs on the frontier, head first.
    pub fn pending_gids(&self) -> Vec<&str> {
        self.frontier.iter().map(Frame::gid).collect()
    }
}

/// Iterator returned by [`TraversalQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a mut TraversalQueue,
}

impl Drain<'_> {
    pub fn offer(&mut self, frame: Frame) -> bool {
        self.queue.offer(frame)
    }

    pub fn offer_gid(&mut self, gid: impl Into<Gid>, parent: Option<Arc<Frame>>) -> bool {
        self.queue.offer_gid(gid, parent)
    }

    /// The queue being drained, e.g. for [`Frame::enqueue_discovered`].
    pub fn queue(&mut self) -> &mut TraversalQueue {
        &mut *self.queue
    }
}

impl Iterator for Drain<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gids(frames: impl IntoIterator<Item = Frame>) -> Vec<String> {
        frames.into_iter().map(|f| f.gid().to_string()).collect()
    }

    #[test]
    fn test_offer_adds_to_the_end() {
        let mut queue = TraversalQueue::new();
        assert!(queue.offer_gid("one", None));
        assert!(queue.offer_gid("two", None));
        assert_eq!(queue.pending_gids(), vec!["one", "two"]);
    }

    #[test]
    fn test_rejects_duplicate_gids() {
        let mut queue = TraversalQueue::new();
        assert!(queue.offer(Frame::new("one", None)));
        assert!(!queue.offer(Frame::new("one", None)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_rejects_gids_seen_before_even_after_visiting() {
        let mut queue = TraversalQueue::new();
        queue.offer_gid("one", None);
        assert_eq!(gids(queue.drain()), vec!["one"]);

        assert!(queue.is_empty());
        assert!(queue.has_seen("one"));
        assert!(!queue.offer_gid("one", None));
    }

    #[test]
    fn test_no_duplicate_visits() {
        let mut queue = TraversalQueue::new();
        let mut drain = queue.drain();
        drain.offer_gid("a", None);
        drain.offer_gid("b", None);

        let mut visited = Vec::new();
        while let Some(frame) = drain.next() {
            // every frame re-offers everything it knows about
            for gid in ["a", "b", "c", frame.gid()] {
                drain.offer_gid(gid.to_string(), None);
            }
            visited.push(frame.gid().to_string());
        }

        assert_eq!(visited, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_enforces_max_size() {
        let mut queue = TraversalQueue::new().with_max_size(Some(5));
        let accepted: Vec<bool> = (1..=10).map(|i| queue.offer_gid(i.to_string(), None)).collect();

        assert_eq!(accepted, [vec![true; 5], vec![false; 5]].concat());
        assert_eq!(queue.pending_gids(), vec!["1", "2", "3", "4", "5"]);
        // overflowed GIDs were not marked as seen
        assert_eq!(queue.seen_count(), 5);
        assert!(!queue.has_seen("6"));
    }

    #[test]
    fn test_max_size_frees_up_after_pop() {
        let mut queue = TraversalQueue::new().with_max_size(Some(2));
        assert!(queue.offer_gid("a", None));
        assert!(queue.offer_gid("b", None));
        assert!(!queue.offer_gid("c", None));

        queue.pop_front();
        assert!(queue.offer_gid("c", None));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_drain_is_fifo_with_offers_mid_drain() {
        let mut queue = TraversalQueue::new();
        queue.offer_gid("a", None);
        queue.offer_gid("b", None);

        let mut drain = queue.drain();
        let mut order = Vec::new();
        while let Some(frame) = drain.next() {
            match frame.gid() {
                "a" => {
                    drain.offer_gid("c", None);
                }
                "b" => {
                    drain.offer_gid("d", None);
                }
                _ => {}
            }
            order.push(frame.gid().to_string());
        }

        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_random_insertion_keeps_the_same_frames() {
        let offer_all = |queue: &mut TraversalQueue| {
            for i in 1..=10 {
                queue.offer_gid(i.to_string(), None);
            }
        };

        let mut fifo = TraversalQueue::new();
        offer_all(&mut fifo);
        let fifo_order = gids(fifo.drain());

        let mut random = TraversalQueue::new().with_random_insertion(true).with_seed(42);
        offer_all(&mut random);
        let random_order = gids(random.drain());

        assert_ne!(random_order, fifo_order);

        let mut sorted = random_order.clone();
        sorted.sort_by_key(|gid| gid.parse::<u32>().unwrap());
        assert_eq!(sorted, fifo_order);
    }

    #[test]
    fn test_random_insertion_is_reproducible_with_a_seed() {
        let run = || {
            let mut queue = TraversalQueue::new().with_random_insertion(true).with_seed(9);
            for i in 0..20 {
                queue.offer_gid(i.to_string(), None);
            }
            gids(queue.drain())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_offer_gid_sets_parent() {
        let parent = Arc::new(Frame::new("parent", None));
        let mut queue = TraversalQueue::new();
        queue.offer_gid("child", Some(Arc::clone(&parent)));

        let frame = queue.pop_front().unwrap();
        assert_eq!(frame.gid(), "child");
        assert_eq!(frame.parent().unwrap().gid(), "parent");
    }

    // Random sequences of offers and pops over a handful of GIDs

    #[derive(Debug, Clone)]
    enum Step {
        Offer(u8),
        Pop,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![(0u8..6).prop_map(Step::Offer), Just(Step::Pop)]
    }

    // Runs the steps, checking the queue after each one, and returns every
    // GID popped (including a final drain)
    fn run_steps(mut queue: TraversalQueue, steps: &[Step]) -> Result<Vec<String>, TestCaseError> {
        let mut popped = Vec::new();

        for step in steps {
            match step {
                Step::Offer(n) => {
                    let (len, seen) = (queue.len(), queue.seen_count());
                    if !queue.offer_gid(format!("gid{}", n), None) {
                        prop_assert_eq!(queue.len(), len);
                        prop_assert_eq!(queue.seen_count(), seen);
                    }
                }
                Step::Pop => popped.extend(queue.pop_front().map(|f| f.gid().to_string())),
            }
            if let Some(max) = queue.max_size() {
                prop_assert!(queue.len() <= max);
            }
        }

        popped.extend(gids(queue.drain()));
        Ok(popped)
    }

    proptest! {
        #[test]
        fn test_no_gid_is_yielded_twice(
            steps in proptest::collection::vec(step(), 0..60),
            max_size in proptest::option::of(0usize..4),
            random in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let queue = TraversalQueue::new()
                .with_max_size(max_size)
                .with_random_insertion(random)
                .with_seed(seed);
            let popped = run_steps(queue, &steps)?;

            let unique: HashSet<&String> = popped.iter().collect();
            prop_assert_eq!(unique.len(), popped.len());
        }

        #[test]
        fn test_random_and_fifo_yield_the_same_gids(
            steps in proptest::collection::vec(step(), 0..60),
            max_size in proptest::option::of(0usize..4),
            seed in any::<u64>(),
        ) {
            let mut fifo = run_steps(TraversalQueue::new().with_max_size(max_size), &steps)?;
            let random_queue = TraversalQueue::new()
                .with_max_size(max_size)
                .with_random_insertion(true)
                .with_seed(seed);
            let mut random = run_steps(random_queue, &steps)?;

            fifo.sort();
            random.sort();
            prop_assert_eq!(fifo, random);
        }
    }
}
