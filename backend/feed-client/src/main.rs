use anyhow::Context;
use feed_client::backend::{MemoryAuth, MemoryPostStore};
use feed_client::clock::{Clock, SystemClock};
use feed_client::feed::{FeedSettings, FeedSynchronizer};
use feed_client::session::{AuthForm, FormOutcome, GateDecision, Route, SessionGate};
use feed_client::{logging, Config};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  open <path>                 go to /, /feed, /login or /signup
  signup <email> <password>   create an account
  login <email> <password>    sign in
  post <text>                 share a post (expires after the configured lifetime)
  feed                        show the feed
  logout                      sign out
  quit";

struct Shell {
    route: Route,
    gate: SessionGate,
    login: AuthForm,
    signup: AuthForm,
    feed: FeedSynchronizer,
}

impl Shell {
    /// Run the gate for `route` and show whatever it lands on
    async fn navigate(&mut self, route: Route) {
        let mut target = route;
        loop {
            match self.gate.resolve(target) {
                GateDecision::Redirect(next) => {
                    tracing::debug!(from = %target, to = %next, "Redirecting");
                    target = next;
                }
                GateDecision::Render(_) => break,
            }
        }

        if self.route == Route::Feed && target != Route::Feed {
            self.feed.detach();
        }
        self.route = target;

        match target {
            Route::Feed => {
                if let Err(err) = self.feed.attach().await {
                    println!("! {}", err.user_message());
                }
                // let the initial snapshot land before rendering
                tokio::task::yield_now().await;
                print!("{}", self.feed.render());
            }
            Route::Login => println!("-- {} --", self.login.button_label()),
            Route::Signup => println!("-- {} --", self.signup.button_label()),
        }
    }

    async fn submit_form(&mut self, kind: Route, email: &str, password: &str) {
        if self.route != kind {
            self.navigate(kind).await;
            if self.route != kind {
                return;
            }
        }

        let form = match kind {
            Route::Signup => &self.signup,
            _ => &self.login,
        };
        form.set_email(email);
        form.set_password(password);

        match form.submit().await {
            FormOutcome::Navigate(route) => self.navigate(route).await,
            FormOutcome::Failed(_) => {
                if let Some(message) = form.state().error {
                    println!("! {}", message);
                }
            }
            FormOutcome::Busy => {}
        }
    }

    async fn handle(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "help" => println!("{}", HELP),
            "quit" | "exit" => return false,
            "open" => match Route::from_path(rest.trim()) {
                Some(route) => self.navigate(route).await,
                None => println!("unknown path: {}", rest.trim()),
            },
            "signup" | "login" => {
                let mut args = rest.split_whitespace();
                let email = args.next().unwrap_or_default();
                let password = args.next().unwrap_or_default();
                let kind = if command == "signup" {
                    Route::Signup
                } else {
                    Route::Login
                };
                self.submit_form(kind, email, password).await;
            }
            "post" => {
                if self.route != Route::Feed {
                    self.navigate(Route::Feed).await;
                    if self.route != Route::Feed {
                        return true;
                    }
                }
                self.feed.set_draft(rest);
                self.feed.submit().await;
                tokio::task::yield_now().await;
                print!("{}", self.feed.render());
            }
            "feed" => self.navigate(Route::Feed).await,
            "logout" => match self.feed.sign_out().await {
                Ok(route) => self.navigate(route).await,
                Err(err) => println!("! {}", err.user_message()),
            },
            other => println!("unknown command: {} (try `help`)", other),
        }
        true
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    logging::init_tracing(config.logging.format);

    tracing::info!(
        env = %config.app.env,
        collection = %config.feed.collection,
        "Starting RealTalk client"
    );
    if config.backend.has_credentials() {
        tracing::warn!("Hosted backend credentials are set but only the in-process backend is available");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = Arc::new(MemoryAuth::new());
    let store = Arc::new(MemoryPostStore::new(clock.clone()));

    let settings = FeedSettings::try_from(&config.feed).context("invalid feed settings")?;

    let mut shell = Shell {
        route: Route::Login,
        gate: SessionGate::new(auth.clone())
            .with_legacy_guest_surfaces(config.session.legacy_guest_surfaces),
        login: AuthForm::login(auth.clone()),
        signup: AuthForm::signup(auth.clone()),
        feed: FeedSynchronizer::new(auth, store, clock, settings),
    };

    println!("{}", HELP);
    shell.navigate(Route::Feed).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if !shell.handle(&line).await {
            break;
        }
    }

    shell.feed.unmount();
    tracing::info!("RealTalk client stopped");
    Ok(())
}
