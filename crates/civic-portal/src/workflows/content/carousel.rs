use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::Slide;

pub const ROTATION_PERIOD: Duration = Duration::from_secs(4);

/// Hero slides with a wrapping cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carousel {
    slides: Vec<Slide>,
    index: usize,
}

impl Carousel {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Slide> {
        self.slides.get(self.index)
    }

    /// Moves to the next slide, wrapping past the last one. No-op when empty.
    pub fn advance(&mut self) -> Option<&Slide> {
        if self.slides.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.slides.len();
        self.current()
    }
}

/// Background rotation; dropping the handle stops it.
#[derive(Debug)]
pub struct SlideRotation {
    handle: JoinHandle<()>,
}

impl Drop for SlideRotation {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Advances `carousel` every `period` and publishes the new index.
///
/// Returns `None` for an empty carousel: there is nothing to rotate and no timer is started.
pub fn spawn_rotation(
    carousel: Arc<Mutex<Carousel>>,
    period: Duration,
) -> Option<(SlideRotation, watch::Receiver<usize>)> {
    let start = {
        let guard = carousel.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_empty() {
            return None;
        }
        guard.index()
    };

    let (sender, receiver) = watch::channel(start);
    let handle = tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            let index = {
                let mut guard = carousel.lock().unwrap_or_else(PoisonError::into_inner);
                guard.advance();
                guard.index()
            };
            if sender.send(index).is_err() {
                break;
            }
        }
    });

    Some((SlideRotation { handle }, receiver))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(count: usize) -> Vec<Slide> {
        (0..count)
            .map(|n| Slide {
                id: Some(format!("s{n}")),
                title: format!("Slide {n}"),
                subtitle: String::new(),
                image: None,
            })
            .collect()
    }

    #[test]
    fn advance_wraps_to_first_slide() {
        let mut carousel = Carousel::new(slides(3));
        assert_eq!(carousel.index(), 0);
        carousel.advance();
        carousel.advance();
        assert_eq!(carousel.index(), 2);
        let wrapped = carousel.advance().map(|slide| slide.title.clone());
        assert_eq!(wrapped.as_deref(), Some("Slide 0"));
    }

    #[test]
    fn empty_carousel_never_moves() {
        let mut carousel = Carousel::new(Vec::new());
        assert!(carousel.advance().is_none());
        assert!(carousel.current().is_none());
        assert_eq!(carousel.index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_ticks_every_period() {
        let carousel = Arc::new(Mutex::new(Carousel::new(slides(2))));
        let (rotation, mut updates) =
            spawn_rotation(carousel.clone(), ROTATION_PERIOD).expect("rotation starts");

        let started = Instant::now();
        updates.changed().await.expect("first rotation");
        assert_eq!(*updates.borrow(), 1);
        assert!(started.elapsed() >= ROTATION_PERIOD);

        updates.changed().await.expect("second rotation");
        assert_eq!(*updates.borrow(), 0);
        assert_eq!(carousel.lock().expect("carousel mutex").index(), 0);

        drop(rotation);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_rotation_stops_timer() {
        let carousel = Arc::new(Mutex::new(Carousel::new(slides(3))));
        let (rotation, mut updates) =
            spawn_rotation(carousel.clone(), ROTATION_PERIOD).expect("rotation starts");

        drop(rotation);
        assert!(updates.changed().await.is_err());
        assert_eq!(carousel.lock().expect("carousel mutex").index(), 0);
    }

    #[tokio::test]
    async fn empty_carousel_starts_no_timer() {
        let carousel = Arc::new(Mutex::new(Carousel::new(Vec::new())));
        assert!(spawn_rotation(carousel, ROTATION_PERIOD).is_none());
    }
}
