//! 路线图生成：固定的两条入门条目 + 按 (课程, 级别) 查表得到的课程条目
//!
//! 课程名与级别大小写不敏感；课程另接受简写（python / dsa）。查不到时只返回入门条目。

use crate::planner::RoadmapItem;

/// (id, 标题, 描述, 时长, 主题)
type ItemSpec = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
);

const BASE_ROADMAP: &[ItemSpec] = &[
    (
        "1",
        "What is Coding?",
        "Understanding the fundamentals of programming and computational thinking",
        "2 days",
        &["Introduction to Programming", "Problem Solving", "Algorithms vs Programs"],
    ),
    (
        "2",
        "High-Level vs Low-Level Languages",
        "Learn the differences between programming language levels and their applications",
        "1 day",
        &["Language Classification", "Compilation vs Interpretation", "Performance Trade-offs"],
    ),
];

const PYTHON_BEGINNER: &[ItemSpec] = &[
    (
        "3",
        "Python Basics",
        "Variables, data types, and basic operations",
        "5 days",
        &["Variables", "Data Types", "Input/Output", "Basic Operators"],
    ),
    (
        "4",
        "Control Structures",
        "Conditional statements and loops",
        "7 days",
        &["If-Else", "For Loops", "While Loops", "Nested Structures"],
    ),
    (
        "5",
        "Functions",
        "Creating and using functions effectively",
        "6 days",
        &["Function Definition", "Parameters", "Return Values", "Scope"],
    ),
    (
        "6",
        "Data Structures",
        "Lists, tuples, dictionaries, and sets",
        "8 days",
        &["Lists", "Tuples", "Dictionaries", "Sets", "List Comprehensions"],
    ),
];

const PYTHON_INTERMEDIATE: &[ItemSpec] = &[
    (
        "3",
        "Object-Oriented Programming",
        "Classes, objects, and OOP principles",
        "10 days",
        &["Classes", "Objects", "Inheritance", "Polymorphism", "Encapsulation"],
    ),
    (
        "4",
        "File Handling & Exceptions",
        "Working with files and error handling",
        "6 days",
        &["File I/O", "Exception Handling", "Context Managers"],
    ),
    (
        "5",
        "Modules & Packages",
        "Code organization and reusability",
        "5 days",
        &["Modules", "Packages", "Import Systems", "Virtual Environments"],
    ),
];

const PYTHON_ADVANCED: &[ItemSpec] = &[
    (
        "3",
        "Advanced Python Concepts",
        "Decorators, generators, and metaclasses",
        "12 days",
        &["Decorators", "Generators", "Context Managers", "Metaclasses"],
    ),
    (
        "4",
        "Concurrency & Performance",
        "Threading, multiprocessing, and optimization",
        "10 days",
        &["Threading", "Multiprocessing", "Async/Await", "Performance Optimization"],
    ),
];

const DSA_BEGINNER: &[ItemSpec] = &[
    (
        "3",
        "Arrays & Strings",
        "Basic data structures and string manipulation",
        "8 days",
        &["Arrays", "Strings", "Two Pointers", "Sliding Window"],
    ),
    (
        "4",
        "Linked Lists",
        "Understanding and implementing linked lists",
        "6 days",
        &["Singly Linked Lists", "Doubly Linked Lists", "Circular Lists"],
    ),
];

pub const PYTHON_COURSE: &str = "Python Programming";
pub const DSA_COURSE: &str = "Data Structures & Algorithms";

fn to_items(specs: &[ItemSpec]) -> Vec<RoadmapItem> {
    specs
        .iter()
        .map(|(id, title, description, duration, topics)| RoadmapItem {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
            completed: false,
            topics: topics.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

/// 规范化课程名：接受全名或简写
pub fn canonical_course(course: &str) -> Option<&'static str> {
    match course.trim().to_lowercase().as_str() {
        "python programming" | "python" => Some(PYTHON_COURSE),
        "data structures & algorithms" | "data structures and algorithms" | "dsa" => {
            Some(DSA_COURSE)
        }
        _ => None,
    }
}

/// 所有课程共用的入门条目
pub fn base_roadmap() -> Vec<RoadmapItem> {
    to_items(BASE_ROADMAP)
}

/// 课程专属条目；未知课程或级别返回空
pub fn course_roadmap(course: &str, level: &str) -> Vec<RoadmapItem> {
    let specs: &[ItemSpec] = match (canonical_course(course), level.trim().to_lowercase().as_str())
    {
        (Some(PYTHON_COURSE), "beginner") => PYTHON_BEGINNER,
        (Some(PYTHON_COURSE), "intermediate") => PYTHON_INTERMEDIATE,
        (Some(PYTHON_COURSE), "advanced") => PYTHON_ADVANCED,
        (Some(DSA_COURSE), "beginner") => DSA_BEGINNER,
        _ => &[],
    };
    to_items(specs)
}

/// 完整路线图：入门条目在前，课程条目在后
pub fn generate_roadmap(course: &str, level: &str) -> Vec<RoadmapItem> {
    let mut roadmap = base_roadmap();
    let specific = course_roadmap(course, level);
    if specific.is_empty() {
        tracing::info!(course, level, "no course-specific roadmap, using base items only");
    }
    roadmap.extend(specific);
    roadmap
}
