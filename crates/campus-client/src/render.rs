//! Plain-text rendering of view-model state.

use campus_core::{complaint::Complaint, user::Session};
use campus_views::{
  AdminConsole, Dashboard, LoadState, MyComplaints, admin::transitions_for,
};

pub fn who(session: &Session) -> String {
  let user = &session.user;
  match (&user.display_name, &user.email) {
    (Some(name), Some(email)) => format!("{name} <{email}>"),
    (None, Some(email)) => email.clone(),
    (Some(name), None) => name.clone(),
    (None, None) => user.user_id.to_string(),
  }
}

pub fn complaint_line(c: &Complaint) -> String {
  format!(
    "{}  {:<11}  {}  {}  [{}]",
    c.complaint_id,
    c.status.to_string(),
    c.created_at.format("%Y-%m-%d %H:%M"),
    c.title,
    c.priority,
  )
}

fn details(c: &Complaint) {
  println!("{}", complaint_line(c));
  for (label, value) in [("Category", &c.category), ("Location", &c.location)] {
    if !value.is_empty() {
      println!("    {label}: {value}");
    }
  }
  if let Some(feedback) = &c.feedback {
    println!("    Feedback: {feedback}");
  }
}

pub fn my_complaints(view: &MyComplaints) {
  if view.is_empty() {
    println!("You have not submitted any complaints yet.");
    return;
  }
  for c in view.complaints() {
    details(c);
  }
}

pub fn dashboard(view: &Dashboard) {
  match &view.state {
    LoadState::Loaded(summary) => {
      let counts = summary.counts;
      println!(
        "Pending: {}   In Progress: {}   Resolved: {}   (total {})",
        counts.pending, counts.in_progress, counts.resolved, counts.total
      );
      if !summary.recent.is_empty() {
        println!("\nRecent complaints:");
        for c in &summary.recent {
          println!("  {}", complaint_line(c));
        }
      }
      if view.show_admin_entry {
        println!("\nAdministrator: run `campus admin` to triage.");
      }
    }
    LoadState::Error(message) => eprintln!("{message}"),
    LoadState::Idle | LoadState::Loading => println!("Loading…"),
  }
  if let Some(notice) = &view.notice {
    eprintln!("{notice}");
  }
}

pub fn admin(console: &AdminConsole) {
  match &console.state {
    LoadState::Loaded(complaints) if complaints.is_empty() => println!("No complaints."),
    LoadState::Loaded(complaints) => {
      for c in complaints {
        details(c);
        println!("    Submitted by: {}", c.submitter_email);
        let offered = transitions_for(c.status);
        if !offered.is_empty() {
          let labels: Vec<String> = offered.iter().map(ToString::to_string).collect();
          println!("    Can move to: {}", labels.join(", "));
        }
      }
    }
    LoadState::Error(message) => eprintln!("{message}"),
    LoadState::Idle | LoadState::Loading => println!("Loading…"),
  }
  if let Some(notice) = &console.notice {
    eprintln!("{notice}");
  }
}
