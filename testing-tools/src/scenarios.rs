use anyhow::Result;
use colored::*;
use std::time::{Duration, Instant};

use crate::api_client::ApiClient;
use crate::auth::AuthenticatedUser;
use crate::output::{print_event, TestResult};
use crate::sse_client::{Connection, Event};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_secs(2);

fn result(scenario: &str, start: Instant, failure: Option<String>) -> TestResult {
    TestResult {
        scenario: scenario.to_string(),
        passed: failure.is_none(),
        message: failure,
        duration: start.elapsed(),
    }
}

/// Checks that the event names the appointment and status we just set.
fn verify_status_event(event: &Event, appointment_id: &str, status: &str) -> Option<String> {
    let received_id = event.data["appointment_id"].as_str().unwrap_or_default();
    let received_status = event.data["status"].as_str().unwrap_or_default();

    if received_id == appointment_id && received_status == status {
        None
    } else {
        Some(format!(
            "Expected appointment_id={}, status={}, got appointment_id={}, status={}",
            appointment_id, status, received_id, received_status
        ))
    }
}

pub async fn test_connection(
    admin_sse: &mut Connection,
    customer_sse: &mut Connection,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Connection ===".bright_cyan().bold());

    for connection in [admin_sse, customer_sse] {
        println!(
            "{} Waiting for connected marker on {}...",
            "→".blue(),
            connection.user_label
        );
        if let Err(e) = connection.wait_for_comment("connected", EVENT_TIMEOUT).await {
            println!("{} No connected marker: {}", "✗".red(), e);
            return Ok(result(
                "connection_test",
                start,
                Some(format!("{}: {}", connection.user_label, e)),
            ));
        }
        println!("{} {} connected", "✓".green(), connection.user_label);
    }

    Ok(result("connection_test", start, None))
}

pub async fn test_status_update(
    admin: &AuthenticatedUser,
    customer: &AuthenticatedUser,
    api_client: &ApiClient,
    admin_sse: &mut Connection,
    customer_sse: &mut Connection,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Status Update ===".bright_cyan().bold());

    println!("{} Customer booking an appointment...", "→".blue());
    let appointment = api_client
        .create_appointment(&customer.token, "sse-test-client: status update")
        .await?;
    let appointment_id = appointment["id"].as_str().unwrap_or_default().to_string();
    println!("{} Appointment created (ID: {})", "✓".green(), appointment_id);

    println!("{} Admin accepting the appointment...", "→".blue());
    api_client
        .update_status(&admin.token, &appointment_id, "accepted")
        .await?;

    println!(
        "{} Waiting for customer to receive appointment_status event...",
        "→".blue()
    );
    let failure = match customer_sse
        .wait_for_event("appointment_status", EVENT_TIMEOUT)
        .await
    {
        Ok(event) => {
            print_event(&customer_sse.user_label, &event);
            verify_status_event(&event, &appointment_id, "accepted")
        }
        Err(e) => Some(format!("Timeout: {}", e)),
    };

    // The admin does not own the appointment, so their stream stays quiet.
    let failure = match failure {
        Some(failure) => Some(failure),
        None => admin_sse
            .expect_silence(SILENCE_WINDOW)
            .await
            .err()
            .map(|e| format!("Admin stream: {}", e)),
    };

    match &failure {
        None => println!("{} Event delivered to the owner only", "✓".green()),
        Some(msg) => println!("{} {}", "✗".red(), msg),
    }

    api_client
        .delete_appointment(&customer.token, &appointment_id)
        .await?;

    Ok(result("status_update", start, failure))
}

pub async fn test_multi_device(
    base_url: &str,
    admin: &AuthenticatedUser,
    customer: &AuthenticatedUser,
    api_client: &ApiClient,
    customer_sse: &mut Connection,
) -> Result<TestResult> {
    let start = Instant::now();

    println!("\n{}", "=== TEST: Multi Device ===".bright_cyan().bold());

    println!("{} Opening a second customer connection...", "→".blue());
    let mut second_device =
        Connection::establish(base_url, &customer.token, "Customer (device 2)".to_string())
            .await?;
    second_device
        .wait_for_comment("connected", EVENT_TIMEOUT)
        .await?;
    println!("{} Second device connected", "✓".green());

    let appointment = api_client
        .create_appointment(&customer.token, "sse-test-client: multi device")
        .await?;
    let appointment_id = appointment["id"].as_str().unwrap_or_default().to_string();

    println!("{} Admin rejecting the appointment...", "→".blue());
    api_client
        .update_status(&admin.token, &appointment_id, "rejected")
        .await?;

    let mut failures = Vec::new();
    for connection in [customer_sse, &mut second_device] {
        match connection
            .wait_for_event("appointment_status", EVENT_TIMEOUT)
            .await
        {
            Ok(event) => {
                print_event(&connection.user_label, &event);
                if let Some(msg) = verify_status_event(&event, &appointment_id, "rejected") {
                    failures.push(format!("{}: {}", connection.user_label, msg));
                }
            }
            Err(e) => failures.push(format!("{}: {}", connection.user_label, e)),
        }
    }

    api_client
        .delete_appointment(&customer.token, &appointment_id)
        .await?;

    let failure = if failures.is_empty() {
        println!("{} Both devices received the event", "✓".green());
        None
    } else {
        println!("{} {}", "✗".red(), failures.join("; "));
        Some(failures.join("; "))
    };

    Ok(result("multi_device", start, failure))
}
