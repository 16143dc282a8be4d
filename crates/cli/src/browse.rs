//! The interactive browsing session: a single consumer loop over stdin
//! commands and loader events. Pages are fetched off this task; rendering
//! happens here, and only for the page the user is still looking at.

use std::sync::Arc;

use {
    anyhow::{Context, Result},
    tokio::io::{AsyncBufReadExt, BufReader},
    tokio::sync::mpsc,
    tonearm_client::{
        ApiClient,
        models::{Artist, Track, UserProfile},
    },
    tonearm_config::Config,
    tonearm_history::NavigationHistory,
    tonearm_media::ImageCache,
    tonearm_pages::{ArtistDetail, ContentLoader, PageContext, PageData, PageEvent, PageRequest, ProfileData},
    tracing::{info, warn},
};

pub async fn run(config: Config) -> Result<()> {
    let mut session = crate::auth_commands::build_session(&config);
    if !session.is_authenticated().await {
        info!("no saved session, starting authorization flow");
        session = crate::auth_commands::login(&config).await?;
    }
    let session = Arc::new(session);
    let api = ApiClient::new(Arc::clone(&session));

    let profile: UserProfile = api
        .get(&config.api.endpoints.users.current_user_profile, &[])
        .await
        .context("failed to fetch the current user profile")?;
    let name = profile
        .display_name
        .clone()
        .unwrap_or_else(|| profile.id.clone());
    println!("Welcome to tonearm, {name}!");

    let cache = Arc::new(
        ImageCache::new(&config.cache.image_dir).context("failed to open the image cache")?,
    );

    let (events_tx, mut events) = mpsc::channel::<PageEvent>(32);
    let mut loader = ContentLoader::new(
        PageContext {
            api: api.clone(),
            endpoints: config.api.endpoints.clone(),
        },
        events_tx,
    );
    let mut history: NavigationHistory<PageRequest> = NavigationHistory::new();
    let mut cards: Vec<Artist> = Vec::new();

    navigate(&mut history, &mut loader, PageRequest::Home);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                handle_event(event, &history, &cache, &mut cards);
                prompt();
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Command::Home => navigate(&mut history, &mut loader, PageRequest::Home),
                    Command::Artists => navigate(&mut history, &mut loader, PageRequest::Artists),
                    Command::Profile => navigate(&mut history, &mut loader, PageRequest::Profile),
                    Command::Artist(n) => match cards.get(n - 1) {
                        Some(artist) => {
                            let request = PageRequest::Artist(artist.clone());
                            navigate(&mut history, &mut loader, request);
                        }
                        None => println!("No card number {n} on this page."),
                    },
                    Command::Back => {
                        if let Some(entry) = history.go_back() {
                            let request = entry.payload.clone();
                            loader.load(&request);
                        } else {
                            println!("Already at the oldest page.");
                        }
                    }
                    Command::Forward => {
                        if let Some(entry) = history.go_forward() {
                            let request = entry.payload.clone();
                            loader.load(&request);
                        } else {
                            println!("Nothing to go forward to.");
                        }
                    }
                    Command::Help => print_help(),
                    Command::Quit => break,
                    Command::Empty => {}
                    Command::Unknown(word) => {
                        println!("Unknown command `{word}`. Type `help` for the list.");
                    }
                }
                prompt();
            }
        }
    }

    println!("Bye!");
    Ok(())
}

/// Record the visit and kick off the fetch. A re-visit of the current page
/// identity is not pushed, but the page still reloads.
fn navigate(
    history: &mut NavigationHistory<PageRequest>,
    loader: &mut ContentLoader,
    request: PageRequest,
) {
    history.visit(request.id(), request.clone());
    loader.load(&request);
}

/// Apply a loader event, but only when it belongs to the page currently on
/// top of the history; events from abandoned fetches are dropped.
fn handle_event(
    event: PageEvent,
    history: &NavigationHistory<PageRequest>,
    cache: &Arc<ImageCache>,
    cards: &mut Vec<Artist>,
) {
    let current = history.current().map(|entry| entry.id.as_str()).unwrap_or("");
    match event {
        PageEvent::Loading { ref id } if id == current => println!("Loading {id} ..."),
        PageEvent::Ready { ref id, ref data } if id == current => {
            render(data, cards);
            prefetch_artwork(cache, data);
        }
        PageEvent::Failed { ref id, ref error } if id == current => {
            println!("Could not load {id}: {error}");
        }
        _ => {}
    }
}

fn render(data: &PageData, cards: &mut Vec<Artist>) {
    match data {
        PageData::Home => {
            println!();
            println!("── Home ──");
            println!("This is the home page. Try `profile` or `artists`.");
        }
        PageData::Artists => {
            println!();
            println!("── Artists ──");
            println!("Open your profile and pick one of your top artists.");
        }
        PageData::Profile(profile) => render_profile(profile, cards),
        PageData::Artist(detail) => render_artist(detail, cards),
    }
}

fn render_profile(data: &ProfileData, cards: &mut Vec<Artist>) {
    let profile = &data.profile;
    println!();
    println!("── Profile ──");
    println!(
        "Display Name: {}",
        profile.display_name.as_deref().unwrap_or("N/A")
    );
    println!("Email:        {}", profile.email.as_deref().unwrap_or("N/A"));
    println!(
        "Country:      {}",
        profile.country.as_deref().unwrap_or("N/A")
    );
    println!("Followers:    {}", profile.followers.total);

    println!();
    println!("The top artists of this month:");
    for (i, artist) in data.top_artists.iter().enumerate() {
        println!("  [{}] {}", i + 1, artist.name);
    }

    println!();
    println!("The top tracks:");
    for track in &data.top_tracks {
        println!("  {}", track_line(track));
    }

    println!();
    println!("Public playlists:");
    for playlist in &data.playlists {
        let owner = playlist.owner.display_name.as_deref().unwrap_or("unknown");
        println!("  {} (by {owner})", playlist.name);
    }

    println!();
    println!("Use `artist <n>` to open one of the artists above.");
    *cards = data.top_artists.clone();
}

fn render_artist(detail: &ArtistDetail, cards: &mut Vec<Artist>) {
    let artist = &detail.artist;
    println!();
    println!("── {} ──", artist.name);
    println!("Followers: {}", artist.followers.total);
    if !artist.genres.is_empty() {
        println!("Genres:    {}", artist.genres.join(", "));
    }

    println!();
    println!("The top tracks:");
    for track in &detail.top_tracks {
        println!("  {}", track_line(track));
    }

    for (title, albums) in [
        ("Albums", &detail.albums),
        ("Singles and EP", &detail.singles),
        ("Appears on", &detail.appears_on),
    ] {
        if albums.is_empty() {
            continue;
        }
        println!();
        println!("{title}:");
        for album in albums {
            let year = album
                .release_date
                .as_deref()
                .and_then(|date| date.get(..4))
                .unwrap_or("----");
            println!("  {} ({year})", album.name);
        }
    }

    if !detail.related.is_empty() {
        println!();
        println!("Related artists:");
        for (i, related) in detail.related.iter().enumerate() {
            println!("  [{}] {}", i + 1, related.name);
        }
        println!("Use `artist <n>` to open a related artist.");
    }
    *cards = detail.related.clone();
}

fn track_line(track: &Track) -> String {
    let artists = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} — {} ({})", track.name, artists, format_duration(track.duration_ms))
}

fn format_duration(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => {
            let secs = ms / 1000;
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "-:--".into(),
    }
}

/// Kick off background downloads for the page's card artwork. Order is
/// irrelevant and failures only cost a log line; the page is already shown.
fn prefetch_artwork(cache: &Arc<ImageCache>, data: &PageData) {
    for url in artwork_urls(data) {
        let cache = Arc::clone(cache);
        tokio::spawn(async move {
            if let Err(e) = cache.fetch(&url).await {
                warn!(url = %url, error = %e, "artwork prefetch failed");
            }
        });
    }
}

fn artwork_urls(data: &PageData) -> Vec<String> {
    let mut urls = Vec::new();
    match data {
        PageData::Home | PageData::Artists => {}
        PageData::Profile(profile) => {
            if let Some(image) = profile.profile.largest_image() {
                urls.push(image.url.clone());
            }
            for artist in &profile.top_artists {
                urls.extend(artist.images.first().map(|img| img.url.clone()));
            }
            for playlist in &profile.playlists {
                urls.extend(playlist.images.first().map(|img| img.url.clone()));
            }
        }
        PageData::Artist(detail) => {
            if let Some(image) = detail.artist.largest_image() {
                urls.push(image.url.clone());
            }
            for album in detail
                .albums
                .iter()
                .chain(&detail.singles)
                .chain(&detail.appears_on)
            {
                urls.extend(album.images.first().map(|img| img.url.clone()));
            }
            for related in &detail.related {
                urls.extend(related.images.first().map(|img| img.url.clone()));
            }
        }
    }
    urls
}

fn prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("Commands: home, artists, profile, artist <n>, back, forward, help, quit");
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Home,
    Artists,
    Profile,
    Artist(usize),
    Back,
    Forward,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Command::Empty;
    };
    match word.to_ascii_lowercase().as_str() {
        "home" => Command::Home,
        "artists" => Command::Artists,
        "profile" => Command::Profile,
        "artist" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => Command::Artist(n),
            _ => Command::Unknown(line.trim().to_string()),
        },
        "back" | "b" => Command::Back,
        "forward" | "f" => Command::Forward,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(word.to_string()),
    }
}
