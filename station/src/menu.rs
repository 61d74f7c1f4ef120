//! Optional interactive satellite menu on stdin, behind `--menu`.
//!
//! Waits up to 30 s for the operator to press Enter; silence proceeds with
//! the persisted list. This actor exits before the tracker begins.

use crate::AppState;
use std::time::Duration;
use tokio::sync::mpsc;

const MENU_WAIT: Duration = Duration::from_secs(30);

fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        use std::io::BufRead;
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn read_line(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    rx.recv().await.unwrap_or_default().trim().to_string()
}

/// Run the startup menu; returns once tracking should begin.
pub async fn run(state: &AppState) {
    let store = state.satlist();
    let mut selected = store.read();

    println!("Wait 30 s or press Enter for menu...");
    let mut lines = spawn_stdin_lines();
    match tokio::time::timeout(MENU_WAIT, lines.recv()).await {
        Err(_) | Ok(None) => return,
        Ok(Some(_)) => {}
    }

    loop {
        println!("\nSATELLITES MENU");
        println!("1. Add satellite");
        println!("2. Remove satellite");
        println!("3. Start tracking");
        println!("0. Exit");
        println!("\nCurrent list:");
        for (i, name) in selected.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }
        print!("\nChoose: ");
        flush_stdout();

        match read_line(&mut lines).await.as_str() {
            "1" => {
                print!("Enter search prefix: ");
                flush_stdout();
                let prefix = read_line(&mut lines).await.to_uppercase();
                let candidates: Vec<String> = state
                    .tle()
                    .names()
                    .into_iter()
                    .filter(|n| n.to_uppercase().contains(&prefix))
                    .collect();
                if candidates.is_empty() {
                    println!("No matches.");
                    continue;
                }
                for (i, name) in candidates.iter().enumerate() {
                    println!("{}. {}", i + 1, name);
                }
                print!("Pick number: ");
                flush_stdout();
                match read_line(&mut lines).await.parse::<usize>() {
                    Ok(nr) if nr >= 1 && nr <= candidates.len() => {
                        let name = candidates[nr - 1].clone();
                        if !selected.contains(&name) {
                            selected.push(name);
                        }
                    }
                    _ => println!("Selection error."),
                }
            }
            "2" => {
                print!("Pick number to remove: ");
                flush_stdout();
                match read_line(&mut lines).await.parse::<usize>() {
                    Ok(nr) if nr >= 1 && nr <= selected.len() => {
                        selected.remove(nr - 1);
                    }
                    _ => println!("Removal error."),
                }
            }
            "3" => {
                store.write(&selected);
                return;
            }
            "0" => std::process::exit(0),
            _ => {}
        }
    }
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
