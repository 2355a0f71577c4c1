//! One function per subcommand. Each drives a view model from `campus-views`
//! against the server and prints the result.

use anyhow::{Context as _, Result, bail};
use campus_client::{HttpClient, settings::SessionFile};
use campus_core::{
  auth::Authorizer as _,
  complaint::{ComplaintDraft, ComplaintStatus},
  store::StatusUpdate,
  user::{FederatedCredential, Registration, Session},
};
use campus_views::{
  AdminConsole, Dashboard, MyComplaints, SubmitForm,
  account::{self, LoginForm, RegisterForm},
};
use uuid::Uuid;

use crate::render;

pub struct Context {
  pub client:       HttpClient,
  pub session_file: SessionFile,
}

impl Context {
  fn session(&self) -> Result<Session> {
    self
      .session_file
      .load()?
      .context("not signed in; run `campus login` first")
  }

  fn signed_in(&self, session: &Session) -> Result<()> {
    self.session_file.save(session)?;
    println!("Signed in as {}", render::who(session));
    Ok(())
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

pub async fn register(
  ctx: &Context,
  full_name: String,
  student_id: String,
  email: String,
  password: String,
  confirm_password: String,
) -> Result<()> {
  let mut form = RegisterForm::new(Registration {
    full_name,
    student_id,
    email,
    password,
    confirm_password,
  });
  let session = form.register(&ctx.client).await?;
  ctx.signed_in(&session)
}

pub async fn login(ctx: &Context, email: String, password: String) -> Result<()> {
  let mut form = LoginForm::new(email, password);
  let session = form.sign_in(&ctx.client).await?;
  ctx.signed_in(&session)
}

pub async fn login_federated(ctx: &Context, provider: String, id_token: String) -> Result<()> {
  let mut form = LoginForm::default();
  let session = form
    .sign_in_federated(&ctx.client, FederatedCredential { provider, id_token })
    .await?;
  ctx.signed_in(&session)
}

pub async fn logout(ctx: &Context) -> Result<()> {
  if let Some(session) = ctx.session_file.load()? {
    account::sign_out(&ctx.client, &session).await?;
  }
  ctx.session_file.clear()?;
  println!("Signed out");
  Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
  let session = ctx.session()?;
  let role = ctx.client.role_of(&session).await?;
  println!("{} ({role})", render::who(&session));
  if let Some(student_id) = &session.user.student_id {
    println!("Student ID: {student_id}");
  }
  Ok(())
}

// ─── Complaints ──────────────────────────────────────────────────────────────

pub async fn submit(ctx: &Context, draft: ComplaintDraft) -> Result<()> {
  let session = ctx.session()?;
  let mut form = SubmitForm::new(draft);
  let outcome = form.submit(&ctx.client, &session).await;
  if let Some(notice) = &form.notice {
    println!("{notice}");
  }
  let complaint = outcome?;
  println!("{}", render::complaint_line(&complaint));
  Ok(())
}

pub async fn mine(ctx: &Context) -> Result<()> {
  let session = ctx.session()?;
  let mut view = MyComplaints::new();
  if view.load(&ctx.client, &session).await.is_err() {
    bail!("{}", view.state.error().unwrap_or("Error loading complaints"));
  }
  render::my_complaints(&view);
  Ok(())
}

pub async fn dashboard(ctx: &Context, watch: bool) -> Result<()> {
  let session = ctx.session()?;
  let mut view = Dashboard::new();
  view.check_role(&ctx.client, &session).await;
  let mut feed = Dashboard::subscribe(&ctx.client, &session)?;

  loop {
    let more = tokio::select! {
      more = view.follow(&mut feed) => more,
      _ = tokio::signal::ctrl_c() => false,
    };
    if !more {
      break;
    }
    render::dashboard(&view);
    if !watch {
      break;
    }
  }
  Ok(())
}

pub async fn admin(ctx: &Context, watch: bool) -> Result<()> {
  let session = ctx.session()?;
  let mut console = AdminConsole::mount(&ctx.client, &session).await?;
  let mut feed = console.subscribe(&ctx.client, &session)?;

  loop {
    let more = tokio::select! {
      more = console.follow(&mut feed) => more,
      _ = tokio::signal::ctrl_c() => false,
    };
    if !more {
      break;
    }
    render::admin(&console);
    if !watch {
      break;
    }
  }
  Ok(())
}

pub async fn set_status(
  ctx: &Context,
  id: Uuid,
  status: ComplaintStatus,
  feedback: Option<String>,
) -> Result<()> {
  let session = ctx.session()?;
  let mut console = AdminConsole::mount(&ctx.client, &session).await?;

  // Load the list once so the offered transitions apply.
  let mut feed = console.subscribe(&ctx.client, &session)?;
  console.follow(&mut feed).await;
  drop(feed);

  let outcome = console
    .update_status(&ctx.client, &session, id, StatusUpdate { status, feedback })
    .await;
  if let Some(notice) = &console.notice {
    println!("{notice}");
  }
  outcome?;
  Ok(())
}
