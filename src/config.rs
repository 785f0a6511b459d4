// ABOUTME: Version, banner, and help text constants for the Toy CLI

pub const VERSION: &str = "1.0.0";

pub const BANNER: &str = r#"
    ╔════════════════════════════════════════════════╗
    ║               TOY LANGUAGE v1.0.0              ║
    ╚════════════════════════════════════════════════╝

    A simple, extensible programming language interpreter
"#;

pub const REPL_GREETING: &str = "Toy Language REPL (Interactive Mode)";
pub const REPL_HINT: &str = "Type 'exit' or 'quit' to exit, 'help' for help.";

pub const HELP_TEXT: &str = r#"Toy Language Help:
  - Type any valid Toy language code to execute it
  - Type 'exit' or 'quit' to exit the REPL
  - Type 'help' to display this help message

Example commands:
  let x = 10;
  print x + 5;
  if (x > 5) { print "x is greater than 5"; }"#;

/// Example programs shown by `--examples`, title and source.
pub const EXAMPLES: &[(&str, &str)] = &[
    (
        "Hello World",
        r#"// Hello World example
print "Hello, World!";
"#,
    ),
    (
        "Variables and Arithmetic",
        r#"// Variables and arithmetic
let x = 10;
let y = 5;
print "x + y = " + (x + y);
print "x - y = " + (x - y);
print "x * y = " + (x * y);
print "x / y = " + (x / y);
"#,
    ),
    (
        "Control Flow",
        r#"// Control flow with if/else
let x = 10;
if (x > 5) {
    print "x is greater than 5";
} else {
    print "x is not greater than 5";
}

// Loop with while
let i = 0;
while (i < 3) {
    print "i = " + i;
    i = i + 1;
}
"#,
    ),
    (
        "Functions",
        r#"// Function declaration and calling
function add(a, b) {
    return a + b;
}

let result = add(5, 3);
print "5 + 3 = " + result;

// Lambda function
let square = (x) => x * x;
print "square(4) = " + square(4);
"#,
    ),
    (
        "Object-Oriented Programming",
        r#"// Class definition
class Person {
    greet() {
        print "Hello, my name is " + this.name;
    }
}

// Creating an instance
let p = new Person();
p.name = "Alice";
p.greet();
"#,
    ),
    (
        "Concurrency",
        r#"// Parallel execution
parallel {
    print "This runs in parallel";
    print "With this";
}

// Repeat syntax
repeat 3 times {
    print "Hi";
}
"#,
    ),
];
