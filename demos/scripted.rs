//! Scripted console example.
//!
//! Runs a script against an evaluation base object without an app loop.
//!
//! Run with: `cargo run --example scripted --no-default-features`

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bevy_console_engine::core::{
    register_builtins, Command, ConsoleEngine, ConsoleError, DevConsole, EvalTarget, MemoryScriptSource,
    ObjectRef, Value,
};
use bevy_console_engine::ConsoleConfig;

struct Player {
    health: AtomicI64,
}

impl EvalTarget for Player {
    fn type_name(&self) -> &str {
        "Player"
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "health" => Some(Value::Int(self.health.load(Ordering::Relaxed))),
            _ => None,
        }
    }

    fn has_method(&self, name: &str) -> bool {
        name == "heal"
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        match (method, args) {
            ("heal", [Value::Int(amount)]) => {
                Ok(Value::Int(self.health.fetch_add(*amount, Ordering::Relaxed) + amount))
            }
            ("heal", _) => Err("heal expects one integer".to_string()),
            _ => Err(format!("Player has no method '{method}'")),
        }
    }
}

const SCRIPT: &str = "\
# set up and inspect the player
alias status \"eval health\"
status
heal(25)
status; echo \"healed\"
damage 10
health > 100
";

fn main() {
    let scripts = MemoryScriptSource::new().with_script("demo.cfg", SCRIPT);
    let mut console = DevConsole::new(ConsoleConfig::default()).with_script_source(scripts);
    if let Err(e) = register_builtins(&mut console) {
        eprintln!("{e}");
        return;
    }

    let player: ObjectRef = Arc::new(Player {
        health: AtomicI64::new(90),
    });
    console.set_eval_base_instance(Some(&player));

    let target = Arc::clone(&player);
    let damage = Command::new("damage", move |args, ctx| {
        let amount: i64 = args.parse(0, "amount")?;
        let health = target.call("heal", &[Value::Int(-amount)]).map_err(ConsoleError::failed)?;
        ctx.info(&format!("health is now {health}"));
        Ok(())
    })
    .description("Hurt the player")
    .arg("amount");
    if let Err(e) = console.register_command(damage) {
        eprintln!("{e}");
        return;
    }

    let status = ConsoleEngine::execute_script(&mut console, "demo.cfg", false);
    for line in console.history() {
        println!("{}", line.text);
    }
    println!("script exited with status {}", status.code());
}
