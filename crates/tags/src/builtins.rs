//! Static name tables used to drop builtin and standard-library references.

use ckg_scanner::Language;

const PYTHON_BUILTINS: &[&str] = &[
    "abs", "aiter", "all", "anext", "any", "ascii", "bin", "bool", "breakpoint", "bytearray",
    "bytes", "callable", "chr", "classmethod", "compile", "complex", "copyright", "credits",
    "delattr", "dict", "dir", "divmod", "enumerate", "eval", "exec", "exit", "filter", "float",
    "format", "frozenset", "getattr", "globals", "hasattr", "hash", "help", "hex", "id", "input",
    "int", "isinstance", "issubclass", "iter", "len", "license", "list", "locals", "map", "max",
    "memoryview", "min", "next", "object", "oct", "open", "ord", "pow", "print", "property",
    "quit", "range", "repr", "reversed", "round", "set", "setattr", "slice", "sorted",
    "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip", "__import__",
    "__build_class__", "__debug__", "__doc__", "__name__", "__package__", "__spec__",
    "__loader__", "Ellipsis", "NotImplemented", "None", "True", "False",
    // Exceptions and warnings
    "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
    "BaseExceptionGroup", "BlockingIOError", "BrokenPipeError", "BufferError", "BytesWarning",
    "ChildProcessError", "ConnectionAbortedError", "ConnectionError", "ConnectionRefusedError",
    "ConnectionResetError", "DeprecationWarning", "EOFError", "EncodingWarning",
    "EnvironmentError", "Exception", "ExceptionGroup", "FileExistsError", "FileNotFoundError",
    "FloatingPointError", "FutureWarning", "GeneratorExit", "IOError", "ImportError",
    "ImportWarning", "IndentationError", "IndexError", "InterruptedError", "IsADirectoryError",
    "KeyError", "KeyboardInterrupt", "LookupError", "MemoryError", "ModuleNotFoundError",
    "NameError", "NotADirectoryError", "NotImplementedError", "OSError", "OverflowError",
    "PendingDeprecationWarning", "PermissionError", "ProcessLookupError", "RecursionError",
    "ReferenceError", "ResourceWarning", "RuntimeError", "RuntimeWarning", "StopAsyncIteration",
    "StopIteration", "SyntaxError", "SyntaxWarning", "SystemError", "SystemExit", "TabError",
    "TimeoutError", "TypeError", "UnboundLocalError", "UnicodeDecodeError",
    "UnicodeEncodeError", "UnicodeError", "UnicodeTranslateError", "UnicodeWarning",
    "UserWarning", "ValueError", "Warning", "ZeroDivisionError",
];

/// Top-level standard-library modules
const PYTHON_STDLIB_MODULES: &[&str] = &[
    "__future__", "abc", "argparse", "array", "ast", "asyncio", "atexit", "base64", "bisect",
    "builtins", "bz2", "calendar", "cmath", "codecs", "collections", "colorsys", "concurrent",
    "configparser", "contextlib", "contextvars", "copy", "copyreg", "csv", "ctypes",
    "dataclasses", "datetime", "decimal", "difflib", "dis", "email", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "gzip", "hashlib",
    "heapq", "hmac", "html", "http", "imaplib", "importlib", "inspect", "io", "ipaddress",
    "itertools", "json", "keyword", "linecache", "locale", "logging", "lzma", "mailbox",
    "marshal", "math", "mimetypes", "mmap", "multiprocessing", "numbers", "operator", "os",
    "pathlib", "pdb", "pickle", "pkgutil", "platform", "plistlib", "pprint", "profile",
    "pstats", "queue", "random", "re", "reprlib", "resource", "sched", "secrets", "select",
    "selectors", "shelve", "shlex", "shutil", "signal", "site", "smtplib", "socket",
    "socketserver", "sqlite3", "ssl", "stat", "statistics", "string", "struct", "subprocess",
    "sys", "sysconfig", "tarfile", "tempfile", "textwrap", "threading", "time", "timeit",
    "tokenize", "trace", "traceback", "tracemalloc", "types", "typing", "unicodedata",
    "unittest", "urllib", "uuid", "warnings", "weakref", "xml", "zipfile", "zlib", "zoneinfo",
];

/// Callable members of commonly imported standard-library modules
const PYTHON_MODULE_CALLABLES: &[(&str, &[&str])] = &[
    ("os", &[
        "abort", "access", "chdir", "chmod", "close", "cpu_count", "fsencode", "fsdecode",
        "fspath", "getcwd", "getenv", "getpid", "kill", "listdir", "lstat", "makedirs", "mkdir",
        "open", "putenv", "read", "readlink", "remove", "removedirs", "rename", "renames",
        "replace", "rmdir", "scandir", "stat", "symlink", "system", "unlink", "urandom", "walk",
        "write",
    ]),
    ("os.path", &[
        "abspath", "basename", "commonpath", "commonprefix", "dirname", "exists", "expanduser",
        "expandvars", "getatime", "getctime", "getmtime", "getsize", "isabs", "isdir", "isfile",
        "islink", "ismount", "join", "lexists", "normcase", "normpath", "realpath", "relpath",
        "samefile", "split", "splitdrive", "splitext",
    ]),
    ("sys", &[
        "exc_info", "exit", "getdefaultencoding", "getrecursionlimit", "getrefcount",
        "getsizeof", "intern", "setrecursionlimit", "settrace",
    ]),
    ("re", &[
        "compile", "escape", "findall", "finditer", "fullmatch", "match", "purge", "search",
        "split", "sub", "subn",
    ]),
    ("json", &["dump", "dumps", "load", "loads", "JSONDecoder", "JSONEncoder"]),
    ("time", &[
        "asctime", "ctime", "gmtime", "localtime", "mktime", "monotonic", "perf_counter",
        "process_time", "sleep", "strftime", "strptime", "time", "time_ns",
    ]),
    ("math", &[
        "ceil", "comb", "copysign", "cos", "degrees", "dist", "exp", "fabs", "factorial",
        "floor", "fmod", "gcd", "hypot", "isclose", "isfinite", "isinf", "isnan", "lcm", "log",
        "log10", "log2", "perm", "pow", "prod", "radians", "sin", "sqrt", "tan", "trunc",
    ]),
    ("random", &[
        "choice", "choices", "gauss", "randint", "random", "randrange", "sample", "seed",
        "shuffle", "uniform", "Random",
    ]),
    ("shutil", &[
        "copy", "copy2", "copyfile", "copytree", "disk_usage", "make_archive", "move", "rmtree",
        "unpack_archive", "which",
    ]),
    ("subprocess", &[
        "call", "check_call", "check_output", "run", "Popen", "CalledProcessError",
        "TimeoutExpired",
    ]),
    ("collections", &[
        "ChainMap", "Counter", "OrderedDict", "UserDict", "UserList", "UserString",
        "defaultdict", "deque", "namedtuple",
    ]),
    ("itertools", &[
        "accumulate", "chain", "combinations", "combinations_with_replacement", "compress",
        "count", "cycle", "dropwhile", "filterfalse", "groupby", "islice", "pairwise",
        "permutations", "product", "repeat", "starmap", "takewhile", "tee", "zip_longest",
    ]),
    ("functools", &[
        "cache", "cached_property", "cmp_to_key", "lru_cache", "partial", "partialmethod",
        "reduce", "singledispatch", "total_ordering", "update_wrapper", "wraps",
    ]),
    ("logging", &[
        "basicConfig", "critical", "debug", "error", "exception", "getLogger", "info", "log",
        "warning", "FileHandler", "Formatter", "Handler", "Logger", "StreamHandler",
    ]),
    ("copy", &["copy", "deepcopy"]),
    ("pickle", &["dump", "dumps", "load", "loads"]),
    ("glob", &["escape", "glob", "iglob"]),
    ("inspect", &[
        "getdoc", "getfile", "getmembers", "getmodule", "getsource", "isclass", "isfunction",
        "ismethod", "signature",
    ]),
    ("typing", &["cast", "get_type_hints", "overload", "NamedTuple", "NewType", "TypeVar"]),
    ("warnings", &["catch_warnings", "filterwarnings", "simplefilter", "warn"]),
    ("tempfile", &[
        "NamedTemporaryFile", "TemporaryDirectory", "TemporaryFile", "gettempdir", "mkdtemp",
        "mkstemp",
    ]),
    ("pathlib", &["Path", "PosixPath", "PurePath", "WindowsPath"]),
    ("datetime", &["date", "datetime", "time", "timedelta", "timezone"]),
    ("threading", &["Event", "Lock", "RLock", "Thread", "Timer", "current_thread"]),
    ("ast", &["dump", "literal_eval", "parse", "unparse", "walk", "NodeVisitor"]),
    ("string", &["capwords", "Formatter", "Template"]),
    ("textwrap", &["dedent", "fill", "indent", "shorten", "wrap"]),
    ("unittest", &["main", "skip", "skipIf", "TestCase", "TestSuite"]),
    ("argparse", &["ArgumentParser", "Namespace"]),
];

const JAVASCRIPT_BUILTINS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "JSON", "Map", "Math", "Number", "Object", "Promise",
    "Reflect", "RegExp", "Set", "String", "Symbol", "TypeError", "WeakMap", "WeakSet",
    "clearInterval", "clearTimeout", "console", "decodeURIComponent", "encodeURIComponent",
    "isFinite", "isNaN", "parseFloat", "parseInt", "require", "setInterval", "setTimeout",
    "log", "warn", "error", "push", "pop", "map", "filter", "forEach", "reduce", "then",
    "catch", "join", "slice", "splice", "toString",
];

const RUST_BUILTINS: &[&str] = &[
    "Box", "Default", "Err", "None", "Ok", "Some", "String", "Vec", "as_ref", "as_str",
    "clone", "collect", "default", "expect", "from", "into", "into_iter", "is_empty", "iter",
    "len", "map", "new", "push", "to_owned", "to_string", "unwrap", "unwrap_or",
];

/// Whether `name` is a builtin of `language`
pub fn is_builtin(language: Language, name: &str) -> bool {
    match language {
        Language::Python => PYTHON_BUILTINS.contains(&name),
        Language::JavaScript | Language::TypeScript | Language::Tsx => {
            JAVASCRIPT_BUILTINS.contains(&name)
        }
        Language::Rust => RUST_BUILTINS.contains(&name),
        Language::Unknown => false,
    }
}

/// Whether a dotted Python module belongs to the standard library
pub fn is_python_stdlib(module: &str) -> bool {
    let top = module.split('.').next().unwrap_or(module);
    PYTHON_STDLIB_MODULES.contains(&top)
}

/// Known callables of a standard-library module, empty when not tabled
pub fn python_module_callables(module: &str) -> &'static [&'static str] {
    PYTHON_MODULE_CALLABLES
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, callables)| *callables)
        .unwrap_or(&[])
}
