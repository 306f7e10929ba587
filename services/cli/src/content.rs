use crate::infra::Context;
use clap::{Args, Subcommand};
use civic_portal::error::AppError;
use civic_portal::files::FileLocator;
use civic_portal::workflows::content::{
    spawn_rotation, Carousel, LandingContent, Slide, NO_SLIDES, ROTATION_PERIOD,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub(crate) enum ContentCommand {
    /// List hero slides
    Slides,
    /// List notices
    Notices,
    /// Rotate through hero slides in the terminal
    Carousel(CarouselArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CarouselArgs {
    /// Stop after this many rotations
    #[arg(long, default_value_t = 3)]
    pub(crate) rotations: usize,
    /// Seconds between slides
    #[arg(long, default_value_t = ROTATION_PERIOD.as_secs())]
    pub(crate) period_secs: u64,
}

pub(crate) async fn run(context: &Context, command: ContentCommand) -> Result<(), AppError> {
    let portal = context.public_portal()?;
    let content = LandingContent::load(&portal).await;

    match command {
        ContentCommand::Slides => {
            if content.slides.is_empty() {
                println!("{NO_SLIDES}");
            }
            for slide in &content.slides {
                println!("{}", describe_slide(slide, portal.files()));
            }
        }
        ContentCommand::Notices => {
            for line in content.notice_lines() {
                println!("- {line}");
            }
        }
        ContentCommand::Carousel(args) => {
            rotate(content.slides, portal.files(), args).await;
        }
    }
    Ok(())
}

async fn rotate(slides: Vec<Slide>, files: &FileLocator, args: CarouselArgs) {
    let carousel = Arc::new(Mutex::new(Carousel::new(slides)));
    let period = Duration::from_secs(args.period_secs.max(1));

    let Some((rotation, mut updates)) = spawn_rotation(carousel.clone(), period) else {
        println!("{NO_SLIDES}");
        return;
    };

    print_current(&carousel, files);
    for _ in 0..args.rotations {
        if updates.changed().await.is_err() {
            break;
        }
        print_current(&carousel, files);
    }
    drop(rotation);
}

fn print_current(carousel: &Mutex<Carousel>, files: &FileLocator) {
    let guard = carousel.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(slide) = guard.current() {
        println!(
            "[{}/{}] {}",
            guard.index() + 1,
            guard.len(),
            describe_slide(slide, files)
        );
    }
}

pub(crate) fn describe_slide(slide: &Slide, files: &FileLocator) -> String {
    if slide.subtitle.trim().is_empty() {
        format!("{} ({})", slide.title, slide.image_url(files))
    } else {
        format!(
            "{}: {} ({})",
            slide.title,
            slide.subtitle,
            slide.image_url(files)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_portal::Url;

    #[test]
    fn slide_without_subtitle_or_image_uses_default_picture() {
        let files = FileLocator::new(Url::parse("http://portal.test").expect("url"));
        let slide = Slide {
            id: None,
            title: "Digital Seva".to_string(),
            subtitle: String::new(),
            image: None,
        };
        assert_eq!(
            describe_slide(&slide, &files),
            "Digital Seva (/default-slide.jpg)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_carousel_returns_immediately() {
        let files = FileLocator::new(Url::parse("http://portal.test").expect("url"));
        rotate(
            Vec::new(),
            &files,
            CarouselArgs {
                rotations: 5,
                period_secs: 4,
            },
        )
        .await;
    }
}
