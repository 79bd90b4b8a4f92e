//! 场景模型与文本渲染
//!
//! 每个类别一个变体，只携带该展示需要的字段；渲染对 Scene 做穷尽匹配。
//! 分支标签、堆栈回溯、模块列表等是固定的装饰内容，不从步骤数据计算。

use std::fmt::Write as _;

use serde_json::Value;

use super::category::Category;
use super::step::{MemoryCell, Step};

/// 装饰性堆栈回溯
pub const STACK_TRACE: [&str; 5] = [
    "File \"main.py\", line 10, in <module>",
    "  result = divide(10, 0)",
    "File \"main.py\", line 5, in divide",
    "  return a / b",
    "ZeroDivisionError: division by zero",
];

/// 装饰性模块列表
pub const MODULE_TREE: [&str; 4] = ["os", "sys", "json", "requests"];

pub const ARRAY_OPERATIONS: [&str; 4] = ["append()", "insert()", "remove()", "pop()"];
pub const DICT_OPERATIONS: [&str; 4] = ["get()", "set()", "del()", "keys()"];

/// 文件流视图中循环显示的行数
const FILE_VIEW_LINES: usize = 10;

/// 单步对应的展示场景
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Variables {
        bindings: Vec<(String, Value)>,
        cells: Vec<MemoryCell>,
    },
    Loops {
        counter: Value,
        range_limit: Option<Value>,
        iteration: usize,
        total: usize,
        body: String,
    },
    Functions {
        frames: Vec<String>,
        locals: Vec<(String, Value)>,
    },
    Arrays {
        elements: Vec<Value>,
        cells: Vec<MemoryCell>,
    },
    Dictionaries {
        entries: Vec<(String, Value)>,
    },
    ControlFlow {
        condition: String,
        true_branch: bool,
    },
    FileHandling {
        current_line: usize,
    },
    ErrorHandling {
        exception_caught: bool,
    },
    Modules {
        statement: String,
    },
}

fn entries(map: &serde_json::Map<String, Value>) -> Vec<(String, Value)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

impl Scene {
    /// 由步骤与游标位置（0-based）构造场景
    pub fn from_step(step: &Step, position: usize, total: usize) -> Self {
        match step.category {
            Category::Variables => Scene::Variables {
                bindings: entries(&step.variables),
                cells: step.memory_cells.clone(),
            },
            Category::Loops => Scene::Loops {
                counter: step.variables.get("i").cloned().unwrap_or(Value::from(0)),
                range_limit: step.variables.get("range_limit").cloned(),
                iteration: position + 1,
                total,
                body: step.highlighted_text.clone(),
            },
            Category::Functions => Scene::Functions {
                frames: step.call_stack.clone(),
                locals: entries(&step.variables),
            },
            Category::Arrays => Scene::Arrays {
                elements: step
                    .variables
                    .get("arr")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                cells: step.memory_cells.clone(),
            },
            Category::Dictionaries => Scene::Dictionaries {
                entries: step
                    .variables
                    .get("dict")
                    .and_then(Value::as_object)
                    .map(entries)
                    .unwrap_or_default(),
            },
            Category::ControlFlow => Scene::ControlFlow {
                condition: step.highlighted_text.clone(),
                true_branch: position % 2 == 0,
            },
            Category::FileHandling => Scene::FileHandling {
                current_line: position % FILE_VIEW_LINES,
            },
            Category::ErrorHandling => Scene::ErrorHandling {
                exception_caught: step.highlighted_text.contains("except")
                    || position * 2 > total,
            },
            Category::Modules => Scene::Modules {
                statement: step.highlighted_text.clone(),
            },
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Scene::Variables { .. } => Category::Variables,
            Scene::Loops { .. } => Category::Loops,
            Scene::Functions { .. } => Category::Functions,
            Scene::Arrays { .. } => Category::Arrays,
            Scene::Dictionaries { .. } => Category::Dictionaries,
            Scene::ControlFlow { .. } => Category::ControlFlow,
            Scene::FileHandling { .. } => Category::FileHandling,
            Scene::ErrorHandling { .. } => Category::ErrorHandling,
            Scene::Modules { .. } => Category::Modules,
        }
    }
}

/// 值的展示文本：字符串不带引号，null 显示为 null
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 把场景渲染为纯文本块（CLI 输出）
pub fn render_text(scene: &Scene) -> String {
    let mut out = String::new();
    let category = scene.category();
    let _ = writeln!(out, "[{}] {}", category.label(), category.title());

    match scene {
        Scene::Variables { bindings, cells } => {
            for (name, value) in bindings {
                let _ = writeln!(out, "  {name} = {}", display_value(value));
            }
            for cell in cells {
                let _ = writeln!(out, "  @{} -> {}", cell.address, display_value(&cell.value));
            }
            let _ = writeln!(out, "  Memory Usage: {} bytes", bindings.len() * 8);
        }
        Scene::Loops {
            counter,
            range_limit,
            iteration,
            total,
            body,
        } => {
            let _ = writeln!(out, "  i = {}", display_value(counter));
            if let Some(limit) = range_limit {
                let _ = writeln!(out, "  range limit: {}", display_value(limit));
            }
            let _ = writeln!(out, "  Iteration {iteration} of {total}");
            let _ = writeln!(out, "  Loop Body Execution: {body}");
        }
        Scene::Functions { frames, locals } => {
            for (depth, frame) in frames.iter().enumerate().rev() {
                let _ = writeln!(out, "  #{depth} {frame}");
            }
            if !locals.is_empty() {
                let _ = writeln!(out, "  Local Variables:");
                for (name, value) in locals {
                    let _ = writeln!(out, "    {name}: {}", display_value(value));
                }
            }
        }
        Scene::Arrays { elements, cells } => {
            let row: Vec<String> = elements.iter().map(display_value).collect();
            let _ = writeln!(out, "  [{}]", row.join(", "));
            for cell in cells {
                let index = cell.index.map(|i| i.to_string()).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  {} [{index}] {}",
                    cell.address,
                    display_value(&cell.value)
                );
            }
            let _ = writeln!(out, "  Array Operations: {}", ARRAY_OPERATIONS.join(" "));
        }
        Scene::Dictionaries { entries } => {
            for (key, value) in entries {
                let _ = writeln!(out, "  {key} => {}", display_value(value));
            }
            let _ = writeln!(out, "  Dictionary Operations: {}", DICT_OPERATIONS.join(" "));
        }
        Scene::ControlFlow {
            condition,
            true_branch,
        } => {
            let _ = writeln!(out, "  Condition: {condition}");
            let branch = if *true_branch { "True Branch" } else { "False Branch" };
            let _ = writeln!(out, "  -> {branch}");
        }
        Scene::FileHandling { current_line } => {
            for line in 0..FILE_VIEW_LINES {
                let marker = if line == *current_line { '>' } else { ' ' };
                let _ = writeln!(out, "  {marker} Line {}: Sample text data...", line + 1);
            }
            let _ = writeln!(out, "  Memory Buffer");
        }
        Scene::ErrorHandling { exception_caught } => {
            let _ = writeln!(out, "  TRY BLOCK -> EXCEPT BLOCK");
            if *exception_caught {
                let _ = writeln!(out, "  Exception Caught!");
            }
            let _ = writeln!(out, "  Stack Trace:");
            for line in STACK_TRACE {
                let _ = writeln!(out, "    {line}");
            }
        }
        Scene::Modules { statement } => {
            let _ = writeln!(out, "  main.py");
            for module in MODULE_TREE {
                let _ = writeln!(out, "  ├── {module}");
            }
            let _ = writeln!(out, "  Import Statements: {statement}");
        }
    }
    out
}
