// LaTeX skeletons, one per résumé style.
// Placeholders: {{NAME}}, {{CONTACT}}, {{BODY}}. Section bodies use enumitem
// itemize lists and hyperref links, so every skeleton loads both.

pub const NAME: &str = "{{NAME}}";
pub const CONTACT: &str = "{{CONTACT}}";
pub const BODY: &str = "{{BODY}}";

pub const SWE: &str = r"\documentclass[letterpaper,11pt]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{latexsym}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage{marvosym}
\usepackage[usenames,dvipsnames]{color}
\usepackage{verbatim}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\usepackage{fancyhdr}
\pagestyle{fancy}
\fancyhf{}
\fancyfoot{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}
\addtolength{\oddsidemargin}{-0.5in}
\addtolength{\evensidemargin}{-0.5in}
\addtolength{\textwidth}{1.0in}
\addtolength{\topmargin}{-0.5in}
\addtolength{\textheight}{1.0in}
\urlstyle{same}
\raggedbottom
\raggedright
\setlength{\tabcolsep}{0in}
\titleformat{\section}{\vspace{-4pt}\scshape\raggedright\large}{}{0em}{}[\color{black}\titlerule \vspace{-5pt}]

\begin{document}

\begin{center}
{\Huge \scshape {{NAME}}} \\ \vspace{1pt}
\small {{CONTACT}}
\end{center}

{{BODY}}
\end{document}
";

pub const CLASSIC: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[margin=0.75in]{geometry}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\pagestyle{empty}

\begin{document}

\begin{center}
{\LARGE\bfseries {{NAME}}} \\[2pt]
{{CONTACT}}
\end{center}

{{BODY}}
\end{document}
";

pub const MODERN: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[scale=0.8]{geometry}
\usepackage{enumitem}
\usepackage{xcolor}
\usepackage[hidelinks]{hyperref}
\usepackage{titlesec}
\definecolor{accent}{RGB}{31,78,121}
\titleformat{\section}{\color{accent}\Large\bfseries}{}{0em}{}[\titlerule]
\pagestyle{empty}

\begin{document}

{\Huge\color{accent} {{NAME}}} \\[4pt]
{{CONTACT}}

{{BODY}}
\end{document}
";

pub const ACADEMIC: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{geometry}
\geometry{a4paper,margin=1in}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}

\begin{document}

\begin{center}
\textbf{\Large {{NAME}}} \\
{{CONTACT}}
\end{center}

{{BODY}}
\end{document}
";

pub const CREATIVE: &str = r"\documentclass{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage[margin=0.7in]{geometry}
\usepackage{multicol}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\pagestyle{empty}

\begin{document}

\begin{center}
\textbf{\Huge {{NAME}}} \\
\small{ {{CONTACT}} }
\end{center}

\begin{multicols}{2}
{{BODY}}
\end{multicols}
\end{document}
";

pub const EXECUTIVE: &str = r"\documentclass[11pt,a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{geometry}
\geometry{a4paper,margin=1in}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\pagestyle{empty}

\begin{document}

\begin{center}
\textbf{\Large {{NAME}}} \\
\textit{Executive Profile} \\
{{CONTACT}}
\end{center}

{{BODY}}
\end{document}
";
